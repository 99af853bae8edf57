//! API-key credentials from a config profile

use super::keys::load_private_key;
use super::{Credentials, SigningMaterial};
use crate::config::OciConfig;
use async_trait::async_trait;
use fss_cmk_core::Result;
use rsa::RsaPrivateKey;
use std::sync::Arc;
use tracing::debug;

/// Static user credentials: `{tenancy}/{user}/{fingerprint}` signed with the
/// profile's private key
pub struct ApiKeyCredentials {
    material: SigningMaterial,
    region: Option<String>,
}

impl ApiKeyCredentials {
    pub fn new(key_id: impl Into<String>, private_key: RsaPrivateKey, region: Option<String>) -> Self {
        Self {
            material: SigningMaterial {
                key_id: key_id.into(),
                private_key: Arc::new(private_key),
            },
            region,
        }
    }

    /// Load the private key named by the profile
    pub fn from_config(config: &OciConfig) -> Result<Self> {
        debug!(
            "Loading API key for profile {} from {}",
            config.profile,
            config.key_file.display()
        );
        let private_key = load_private_key(&config.key_file, config.pass_phrase.as_deref())?;
        Ok(Self::new(config.key_id(), private_key, config.region.clone()))
    }
}

#[async_trait]
impl Credentials for ApiKeyCredentials {
    async fn signing_material(&self) -> Result<SigningMaterial> {
        Ok(self.material.clone())
    }

    fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn name(&self) -> &'static str {
        "api-key"
    }
}
