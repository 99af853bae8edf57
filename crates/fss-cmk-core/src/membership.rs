//! Protection group membership
//!
//! Distinguishes "no file-system members" (`Ok(vec![])`) from "could not
//! fetch the group" (`Err`); the caller picks what a fetch failure means.

use crate::error::Error;
use crate::services::DisasterRecoveryService;
use thiserror::Error as ThisError;
use tracing::debug;

/// Fetching the protection group failed
#[derive(ThisError, Debug)]
#[error("Error in fetching DRPG Details: {reason}")]
pub struct MembershipError {
    /// Operator-facing reason reported by the service or transport
    pub reason: String,
    #[source]
    pub source: Error,
}

impl From<Error> for MembershipError {
    fn from(source: Error) -> Self {
        Self {
            reason: source.reason(),
            source,
        }
    }
}

/// Identifiers of the protection group's `FILE_SYSTEM` members, in the order
/// the service returned them.
pub async fn fetch_file_system_members(
    dr: &dyn DisasterRecoveryService,
    group_id: &str,
) -> std::result::Result<Vec<String>, MembershipError> {
    let members = dr.list_protection_group_members(group_id).await?;
    debug!("Protection group has {} members", members.len());

    Ok(members
        .into_iter()
        .filter(|m| m.is_file_system())
        .map(|m| m.member_id)
        .collect())
}
