//! Request signing
//!
//! Every control-plane call carries an RSA-SHA256 HTTP signature
//! (draft-cavage-http-signatures) over `date (request-target) host`, plus
//! `content-length content-type x-content-sha256` when the request has a
//! body. Credentials only differ in where the key id and private key come
//! from.

pub mod api_key;
pub mod instance_principal;
pub mod keys;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use fss_cmk_core::{Error, Result};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub use api_key::ApiKeyCredentials;
pub use instance_principal::InstancePrincipalCredentials;

/// Key id and private key used to sign one request
#[derive(Clone)]
pub struct SigningMaterial {
    pub key_id: String,
    pub private_key: Arc<RsaPrivateKey>,
}

impl std::fmt::Debug for SigningMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningMaterial")
            .field("key_id", &self.key_id)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Source of signing material
#[async_trait]
pub trait Credentials: Send + Sync {
    /// Current signing material, refreshed by the implementation as needed
    async fn signing_material(&self) -> Result<SigningMaterial>;

    /// Region the credentials are bound to, if known
    fn region(&self) -> Option<&str>;

    /// Credential kind for log messages
    fn name(&self) -> &'static str;
}

/// Sign `request` in place, adding the signed headers and `authorization`.
pub fn sign_request(material: &SigningMaterial, request: &mut Request) -> Result<()> {
    let headers = signed_headers(request);
    let signature = sign(&material.private_key, &signing_string(&headers))?;

    let names: Vec<&str> = headers.iter().map(|(name, _)| *name).collect();
    let authorization = format!(
        "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
        material.key_id,
        names.join(" "),
        signature
    );

    let target = request.headers_mut();
    for (name, value) in headers.iter().filter(|(name, _)| *name != REQUEST_TARGET) {
        target.insert(HeaderName::from_static(*name), header_value(value)?);
    }
    target.insert(AUTHORIZATION, header_value(&authorization)?);
    Ok(())
}

const REQUEST_TARGET: &str = "(request-target)";

/// Headers covered by the signature, in signing order
fn signed_headers(request: &Request) -> Vec<(&'static str, String)> {
    let url = request.url();
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let target = match url.query() {
        Some(query) => format!("{} {}?{}", request.method().as_str().to_lowercase(), url.path(), query),
        None => format!("{} {}", request.method().as_str().to_lowercase(), url.path()),
    };

    let mut headers = vec![
        ("date", Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
        (REQUEST_TARGET, target),
        ("host", host),
    ];

    if has_body(request.method()) {
        let body = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        headers.push(("content-length", body.len().to_string()));
        headers.push(("content-type", content_type));
        headers.push(("x-content-sha256", BASE64.encode(Sha256::digest(body))));
    }

    headers
}

fn has_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// `name: value` lines joined by newlines
pub fn signing_string(headers: &[(&str, String)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Base64 RSA-SHA256 (PKCS#1 v1.5) signature of `data`
pub fn sign(private_key: &RsaPrivateKey, data: &str) -> Result<String> {
    let digest = Sha256::digest(data.as_bytes());
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| Error::auth(format!("Failed to sign request: {}", e)))?;
    Ok(BASE64.encode(signature))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::auth(format!("Invalid header value for signed request: {}", e)))
}
