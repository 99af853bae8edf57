//! Service endpoint construction

/// Service names as they appear in endpoint host names
pub const IDENTITY: &str = "identity";
pub const DISASTER_RECOVERY: &str = "disaster-recovery";
pub const FILE_STORAGE: &str = "filestorage";
pub const AUTH: &str = "auth";

/// Second-level domain of a realm (e.g., "oc1" -> "oraclecloud.com").
///
/// Unknown realms fall back to the commercial domain.
pub fn realm_domain(realm: &str) -> &'static str {
    match realm.to_ascii_lowercase().as_str() {
        "oc2" | "oc3" => "oraclegovcloud.com",
        "oc4" => "oraclegovcloud.uk",
        "oc8" => "oraclecloud8.com",
        "oc9" => "oraclecloud9.com",
        "oc10" => "oraclecloud10.com",
        _ => "oraclecloud.com",
    }
}

/// `https://{service}.{region}.oci.{domain}`
pub fn service_endpoint(service: &str, region: &str, domain: &str) -> String {
    format!("https://{}.{}.oci.{}", service, region, domain)
}

/// Federation endpoint used by instance principals
pub fn auth_endpoint(region: &str, domain: &str) -> String {
    format!("https://{}.{}.{}", AUTH, region, domain)
}
