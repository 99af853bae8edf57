//! Identity control-plane adapter

use crate::client::OciClient;
use crate::endpoints::{service_endpoint, IDENTITY};
use async_trait::async_trait;
use fss_cmk_core::{IdentityService, Region, Result};

const API_VERSION: &str = "20160918";

pub struct IdentityClient {
    client: OciClient,
    endpoint: String,
}

impl IdentityClient {
    pub fn new(client: OciClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn for_region(client: OciClient, region: &str, domain: &str) -> Self {
        Self::new(client, service_endpoint(IDENTITY, region, domain))
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    async fn list_regions(&self) -> Result<Vec<Region>> {
        let url = format!("{}/{}/regions", self.endpoint, API_VERSION);
        Ok(self.client.get(IDENTITY, &url).await?.data)
    }
}
