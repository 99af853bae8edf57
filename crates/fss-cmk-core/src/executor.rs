//! Update executor

use crate::error::Result;
use crate::services::FileStorageService;
use crate::types::UpdateResult;
use tracing::debug;

/// Issue the key update for one file system.
///
/// The service response is the only success signal; nothing is read back.
pub async fn apply(
    file_storage: &dyn FileStorageService,
    member_id: &str,
    target_key_id: &str,
) -> Result<UpdateResult> {
    debug!("Setting kmsKeyId on {}", member_id);
    file_storage.update_kms_key(member_id, target_key_id).await
}
