//! Disaster-recovery control-plane adapter

use crate::client::OciClient;
use crate::endpoints::{service_endpoint, DISASTER_RECOVERY};
use async_trait::async_trait;
use fss_cmk_core::{DisasterRecoveryService, ProtectionGroupMember, Result};
use serde::Deserialize;
use tracing::debug;

const API_VERSION: &str = "20220125";

/// The slice of a protection group this tool reads
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrProtectionGroup {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    members: Vec<ProtectionGroupMember>,
}

pub struct DisasterRecoveryClient {
    client: OciClient,
    endpoint: String,
}

impl DisasterRecoveryClient {
    pub fn new(client: OciClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn for_region(client: OciClient, region: &str, domain: &str) -> Self {
        Self::new(client, service_endpoint(DISASTER_RECOVERY, region, domain))
    }
}

#[async_trait]
impl DisasterRecoveryService for DisasterRecoveryClient {
    async fn list_protection_group_members(
        &self,
        group_id: &str,
    ) -> Result<Vec<ProtectionGroupMember>> {
        let url = format!("{}/{}/drProtectionGroups/{}", self.endpoint, API_VERSION, group_id);
        let group: DrProtectionGroup = self.client.get(DISASTER_RECOVERY, &url).await?.data;
        debug!(
            "Protection group {} has {} members",
            group.display_name.as_deref().unwrap_or(group_id),
            group.members.len()
        );
        Ok(group.members)
    }
}
