//! RSA key and certificate helpers

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fss_cmk_core::{Error, Result};
use pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use std::path::Path;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

/// Parse a PEM private key in PKCS#1, PKCS#8 or encrypted PKCS#8 form
pub fn parse_private_key(pem: &str, pass_phrase: Option<&str>) -> Result<RsaPrivateKey> {
    if pem.contains("BEGIN ENCRYPTED PRIVATE KEY") {
        let pass_phrase = pass_phrase.ok_or_else(|| {
            Error::invalid_config("Private key is encrypted but no pass_phrase was provided")
        })?;
        return RsaPrivateKey::from_pkcs8_encrypted_pem(pem, pass_phrase.as_bytes())
            .map_err(|e| Error::invalid_config(format!("Failed to decrypt private key: {}", e)));
    }

    if pem.contains("BEGIN RSA PRIVATE KEY") {
        if pem.contains("Proc-Type: 4,ENCRYPTED") {
            return Err(Error::invalid_config(
                "Legacy encrypted PKCS#1 keys are not supported; convert the key to encrypted PKCS#8",
            ));
        }
        return RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|e| Error::invalid_config(format!("Invalid PKCS#1 private key: {}", e)));
    }

    RsaPrivateKey::from_pkcs8_pem(pem)
        .map_err(|e| Error::invalid_config(format!("Invalid PKCS#8 private key: {}", e)))
}

/// Read and parse a private key file
pub fn load_private_key(path: &Path, pass_phrase: Option<&str>) -> Result<RsaPrivateKey> {
    let pem = std::fs::read_to_string(path).map_err(|e| {
        Error::invalid_config(format!("Failed to read key file {}: {}", path.display(), e))
    })?;
    parse_private_key(&pem, pass_phrase)
}

/// Public half of `key` as a PEM `PUBLIC KEY` block
pub fn public_key_pem(key: &RsaPrivateKey) -> Result<String> {
    key.to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| Error::auth(format!("Failed to encode public key: {}", e)))
}

/// PEM body without the BEGIN/END lines and line breaks
pub fn strip_pem(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect()
}

/// A parsed X.509 certificate plus its original PEM
#[derive(Debug, Clone)]
pub struct PemCertificate {
    pub pem: String,
    certificate: Certificate,
}

impl PemCertificate {
    pub fn parse(pem: &str) -> Result<Self> {
        let certificate = Certificate::from_pem(pem.as_bytes())
            .map_err(|e| Error::auth(format!("Invalid certificate: {}", e)))?;
        Ok(Self {
            pem: pem.to_string(),
            certificate,
        })
    }

    /// Subject distinguished name (RFC 4514)
    pub fn subject(&self) -> String {
        self.certificate.tbs_certificate.subject.to_string()
    }

    /// Tenancy OCID carried in the `opc-tenant:` (or `opc-identity:`)
    /// subject attribute
    pub fn tenancy_id(&self) -> Result<String> {
        let subject = self.subject();
        ["opc-tenant:", "opc-identity:"]
            .iter()
            .find_map(|prefix| {
                subject.find(prefix).map(|start| {
                    subject[start + prefix.len()..]
                        .split([',', '+'])
                        .next()
                        .unwrap_or_default()
                        .to_string()
                })
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::auth(format!(
                    "Certificate subject does not carry a tenancy id: {}",
                    subject
                ))
            })
    }

    /// Colon-separated upper-case SHA-256 fingerprint of the DER encoding
    pub fn sha256_fingerprint(&self) -> Result<String> {
        let der = self
            .certificate
            .to_der()
            .map_err(|e| Error::auth(format!("Failed to encode certificate: {}", e)))?;
        Ok(Sha256::digest(der)
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":"))
    }
}

/// Decode the claims segment of a JWT without verifying it
pub fn jwt_claims(token: &str) -> Result<serde_json::Value> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::auth("Security token is not a JWT"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::auth(format!("Security token payload is not base64: {}", e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}
