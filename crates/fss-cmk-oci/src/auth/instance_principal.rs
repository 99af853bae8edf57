//! Instance-principal credentials
//!
//! The instance metadata service hands out a short-lived leaf certificate
//! and key identifying the instance. Those are exchanged at the auth
//! service's x509 federation endpoint for a security token bound to a fresh
//! session key; control-plane requests are then signed with
//! `keyId="ST$<token>"` and the session key.

use super::keys::{jwt_claims, parse_private_key, public_key_pem, strip_pem, PemCertificate};
use super::{sign_request, Credentials, SigningMaterial};
use crate::endpoints::auth_endpoint;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fss_cmk_core::{Error, Result};
use rand_core::OsRng;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Instance metadata service, v2 API
pub const METADATA_BASE_URL: &str = "http://169.254.169.254/opc/v2";

const METADATA_AUTHORIZATION: &str = "Bearer Oracle";
const SESSION_KEY_BITS: usize = 2048;
const METADATA_TIMEOUT_SECS: u64 = 10;

/// Tokens are refreshed this long before their `exp` claim
const REFRESH_MARGIN_SECS: i64 = 60;

pub struct InstancePrincipalCredentials {
    http: reqwest::Client,
    metadata_base: String,
    federation_endpoint: String,
    region: String,
    session: RwLock<Option<Session>>,
}

struct Session {
    material: SigningMaterial,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(REFRESH_MARGIN_SECS) < expires_at,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceMetadata {
    canonical_region_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FederationRequest {
    certificate: String,
    public_key: String,
    intermediate_certificates: Vec<String>,
    purpose: &'static str,
    fingerprint_algorithm: &'static str,
}

#[derive(Debug, Deserialize)]
struct FederationResponse {
    token: String,
}

impl InstancePrincipalCredentials {
    /// Discover the instance's region from the metadata service; the
    /// federation endpoint is derived from it and the realm `domain`.
    pub async fn discover(domain: &str) -> Result<Self> {
        Self::discover_with(METADATA_BASE_URL, None, domain).await
    }

    /// Like [`discover`](Self::discover) with explicit endpoints
    pub async fn discover_with(
        metadata_base: &str,
        federation_endpoint: Option<String>,
        domain: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fss-cmk/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(METADATA_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::transport("instance-metadata", e.to_string()))?;

        let mut credentials = Self {
            http,
            metadata_base: metadata_base.trim_end_matches('/').to_string(),
            federation_endpoint: String::new(),
            region: String::new(),
            session: RwLock::new(None),
        };

        let body = credentials.metadata("/instance/").await?;
        let instance: InstanceMetadata = serde_json::from_str(&body)?;
        credentials.federation_endpoint = federation_endpoint
            .unwrap_or_else(|| auth_endpoint(&instance.canonical_region_name, domain));
        credentials.region = instance.canonical_region_name;

        info!(
            "Using instance principal credentials in region {}",
            credentials.region
        );
        Ok(credentials)
    }

    async fn metadata(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.metadata_base, path);
        debug!("Reading instance metadata {}", url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, METADATA_AUTHORIZATION)
            .send()
            .await
            .map_err(|e| Error::transport("instance-metadata", e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport("instance-metadata", e.to_string()))?;

        if !status.is_success() {
            return Err(Error::auth(format!(
                "Instance metadata {} returned {}: {}",
                path, status, text
            )));
        }
        Ok(text)
    }

    /// Exchange the instance identity for a fresh security token
    async fn federate(&self) -> Result<Session> {
        let leaf = PemCertificate::parse(&self.metadata("/identity/cert.pem").await?)?;
        let leaf_key = parse_private_key(&self.metadata("/identity/key.pem").await?, None)?;
        let intermediate = self.metadata("/identity/intermediate.pem").await?;

        let tenancy = leaf.tenancy_id()?;
        let fingerprint = leaf.sha256_fingerprint()?;

        let session_key = RsaPrivateKey::new(&mut OsRng, SESSION_KEY_BITS)
            .map_err(|e| Error::auth(format!("Failed to generate session key: {}", e)))?;

        let body = FederationRequest {
            certificate: strip_pem(&leaf.pem),
            public_key: strip_pem(&public_key_pem(&session_key)?),
            intermediate_certificates: vec![strip_pem(&intermediate)],
            purpose: "DEFAULT",
            fingerprint_algorithm: "SHA256",
        };

        let url = format!("{}/v1/x509", self.federation_endpoint);
        let mut request = self
            .http
            .post(&url)
            .json(&body)
            .build()
            .map_err(|e| Error::transport("auth", e.to_string()))?;

        let federation_key = SigningMaterial {
            key_id: format!("{}/fed-x509-sha256/{}", tenancy, fingerprint),
            private_key: Arc::new(leaf_key),
        };
        sign_request(&federation_key, &mut request)?;

        debug!("Requesting security token from {}", url);
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::transport("auth", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Security token request failed ({}): {}",
                status, text
            )));
        }

        let token = response
            .json::<FederationResponse>()
            .await
            .map_err(|e| Error::auth(format!("Failed to parse security token response: {}", e)))?
            .token;

        let expires_at = jwt_claims(&token)
            .ok()
            .and_then(|claims| claims.get("exp").and_then(|v| v.as_i64()))
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());

        debug!("Obtained security token expiring at {:?}", expires_at);
        Ok(Session {
            material: SigningMaterial {
                key_id: format!("ST${}", token),
                private_key: Arc::new(session_key),
            },
            expires_at,
        })
    }
}

#[async_trait]
impl Credentials for InstancePrincipalCredentials {
    async fn signing_material(&self) -> Result<SigningMaterial> {
        {
            let session = self.session.read().await;
            if let Some(session) = session.as_ref().filter(|s| s.is_fresh(Utc::now())) {
                return Ok(session.material.clone());
            }
        }

        let mut session = self.session.write().await;
        if let Some(current) = session.as_ref().filter(|s| s.is_fresh(Utc::now())) {
            return Ok(current.material.clone());
        }

        let fresh = self.federate().await?;
        let material = fresh.material.clone();
        *session = Some(fresh);
        Ok(material)
    }

    fn region(&self) -> Option<&str> {
        Some(&self.region)
    }

    fn name(&self) -> &'static str {
        "instance-principal"
    }
}
