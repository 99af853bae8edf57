//! OCI config file loading
//!
//! INI-style profiles:
//!
//! ```text
//! [DEFAULT]
//! user=ocid1.user.oc1..aaaa
//! fingerprint=20:3b:97:13:55:1c:...
//! key_file=~/.oci/oci_api_key.pem
//! tenancy=ocid1.tenancy.oc1..aaaa
//! region=us-ashburn-1
//! ```
//!
//! Named profiles inherit any key they do not set from `DEFAULT`.

use fss_cmk_core::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Profile used when none is named
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Credentials and region of one config profile
#[derive(Clone, PartialEq, Eq)]
pub struct OciConfig {
    pub profile: String,
    pub user: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub tenancy: String,
    pub region: Option<String>,
    pub pass_phrase: Option<String>,
}

impl std::fmt::Debug for OciConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciConfig")
            .field("profile", &self.profile)
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .field("key_file", &self.key_file)
            .field("tenancy", &self.tenancy)
            .field("region", &self.region)
            .field("pass_phrase", &self.pass_phrase.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl OciConfig {
    /// Load `profile` from the config file at `path`
    pub fn from_file(path: &Path, profile: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, profile, base_dir)
    }

    /// Parse `profile` out of config file content.
    ///
    /// Relative `key_file` paths resolve against `base_dir`.
    pub fn parse(content: &str, profile: &str, base_dir: &Path) -> Result<Self> {
        let profiles = parse_profiles(content)?;

        let mut values = profiles.get(DEFAULT_PROFILE).cloned().unwrap_or_default();
        match profiles.get(profile) {
            Some(section) => values.extend(section.clone()),
            None => {
                let mut available: Vec<&str> = profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(Error::invalid_config(format!(
                    "Profile '{}' not found in config file. Available profiles: {}",
                    profile,
                    available.join(", ")
                )));
            }
        }

        let required = |key: &str| -> Result<String> {
            values
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    Error::invalid_config(format!(
                        "Missing required field '{}' in profile '{}'",
                        key, profile
                    ))
                })
        };

        let key_file = resolve_key_file(&required("key_file")?, base_dir)?;
        let config = Self {
            profile: profile.to_string(),
            user: required("user")?,
            fingerprint: required("fingerprint")?,
            key_file,
            tenancy: required("tenancy")?,
            region: values.get("region").filter(|v| !v.is_empty()).cloned(),
            pass_phrase: values.get("pass_phrase").filter(|v| !v.is_empty()).cloned(),
        };

        debug!("Loaded config profile {}", config.profile);
        Ok(config)
    }

    /// Key id used in API-key request signatures
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

fn resolve_key_file(raw: &str, base_dir: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        Error::invalid_config(format!("Failed to expand key_file path {}: {}", raw, e))
    })?;
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base_dir.join(path))
    }
}

/// Split config content into `section -> key -> value`
fn parse_profiles(content: &str) -> Result<HashMap<String, HashMap<String, String>>> {
    let mut profiles: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            profiles.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::invalid_config(format!(
                "Malformed line {} in config file: expected key=value",
                idx + 1
            )));
        };

        let Some(section) = current.as_ref() else {
            return Err(Error::invalid_config(format!(
                "Line {} in config file is outside of any [profile] section",
                idx + 1
            )));
        };

        profiles
            .entry(section.clone())
            .or_default()
            .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
# OCI config
[DEFAULT]
user=ocid1.user.oc1..default
fingerprint=aa:bb:cc
key_file=/keys/default.pem
tenancy=ocid1.tenancy.oc1..tenant
region=us-ashburn-1

; standby credentials
[STANDBY]
user = ocid1.user.oc1..standby
key_file = keys/standby.pem
region = us-phoenix-1
pass_phrase = secret
";

    #[test]
    fn test_parse_default_profile() {
        let config = OciConfig::parse(SAMPLE, DEFAULT_PROFILE, Path::new("/home/op/.oci")).unwrap();
        assert_eq!(config.user, "ocid1.user.oc1..default");
        assert_eq!(config.key_file, PathBuf::from("/keys/default.pem"));
        assert_eq!(config.region.as_deref(), Some("us-ashburn-1"));
        assert!(config.pass_phrase.is_none());
        assert_eq!(
            config.key_id(),
            "ocid1.tenancy.oc1..tenant/ocid1.user.oc1..default/aa:bb:cc"
        );
    }

    #[test]
    fn test_named_profile_inherits_default() {
        let config = OciConfig::parse(SAMPLE, "STANDBY", Path::new("/home/op/.oci")).unwrap();
        assert_eq!(config.user, "ocid1.user.oc1..standby");
        assert_eq!(config.fingerprint, "aa:bb:cc");
        assert_eq!(config.tenancy, "ocid1.tenancy.oc1..tenant");
        assert_eq!(config.region.as_deref(), Some("us-phoenix-1"));
        assert_eq!(config.pass_phrase.as_deref(), Some("secret"));
        assert_eq!(
            config.key_file,
            PathBuf::from("/home/op/.oci/keys/standby.pem")
        );
    }

    #[test]
    fn test_missing_profile_lists_available() {
        let err = OciConfig::parse(SAMPLE, "NOPE", Path::new(".")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Profile 'NOPE' not found"), "got: {}", msg);
        assert!(msg.contains("DEFAULT, STANDBY"), "got: {}", msg);
    }

    #[test]
    fn test_missing_required_field() {
        let content = "[DEFAULT]\nuser=u\nfingerprint=f\nkey_file=/k.pem\n";
        let err = OciConfig::parse(content, DEFAULT_PROFILE, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("'tenancy'"));
    }

    #[test]
    fn test_option_names_are_case_insensitive() {
        let content = "[DEFAULT]\nUser=u\nFINGERPRINT=f\nKey_File=/k.pem\nTenancy=t\nRegion=us-ashburn-1\n";
        let config = OciConfig::parse(content, DEFAULT_PROFILE, Path::new(".")).unwrap();
        assert_eq!(config.user, "u");
        assert_eq!(config.fingerprint, "f");
        assert_eq!(config.key_file, PathBuf::from("/k.pem"));
        assert_eq!(config.region.as_deref(), Some("us-ashburn-1"));
    }

    #[test]
    fn test_line_outside_section_rejected() {
        let err = OciConfig::parse("user=u\n[DEFAULT]\n", DEFAULT_PROFILE, Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("outside of any [profile] section"));
    }

    #[test]
    fn test_malformed_line_rejected() {
        let err = OciConfig::parse("[DEFAULT]\nnot a pair\n", DEFAULT_PROFILE, Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("Malformed line 2"));
    }

    #[test]
    fn test_from_file_resolves_relative_to_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = OciConfig::from_file(&path, "STANDBY").unwrap();
        assert_eq!(config.key_file, temp_dir.path().join("keys/standby.pem"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = OciConfig::from_file(Path::new("/nonexistent/oci/config"), DEFAULT_PROFILE)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_debug_redacts_pass_phrase() {
        let config = OciConfig::parse(SAMPLE, "STANDBY", Path::new("/")).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
