//! Shared helpers for fss-cmk-oci integration tests

#![allow(dead_code)]

use fss_cmk_oci::auth::keys::parse_private_key;
use fss_cmk_oci::{ApiKeyCredentials, OciClient};
use std::sync::Arc;

pub const API_KEY_PEM: &str = include_str!("../fixtures/api_key.pem");
pub const LEAF_CERT_PEM: &str = include_str!("../fixtures/leaf_cert.pem");
pub const LEAF_KEY_PEM: &str = include_str!("../fixtures/leaf_key.pem");
pub const INTERMEDIATE_CERT_PEM: &str = include_str!("../fixtures/intermediate_cert.pem");

pub const TEST_KEY_ID: &str = "ocid1.tenancy.oc1..t/ocid1.user.oc1..u/aa:bb";

/// Client signing with the fixture API key
pub fn signed_client() -> OciClient {
    let key = parse_private_key(API_KEY_PEM, None).unwrap();
    let credentials = ApiKeyCredentials::new(TEST_KEY_ID, key, Some("us-ashburn-1".to_string()));
    OciClient::new(Arc::new(credentials)).unwrap()
}

/// Unsigned JWT with the given `exp` claim
pub fn fake_token(exp: i64) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
    format!("{}.{}.signature", header, claims)
}
