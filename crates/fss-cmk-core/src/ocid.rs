//! Protection group identifier parsing
//!
//! Identifiers have the compound form
//! `ocid1.<resource-type>.<realm>.<region>[.<future-use>].<unique-id>`.
//! The region segment is positional (index 3); everything in this crate that
//! depends on that layout goes through this module.

use crate::error::{Error, Result};
use std::fmt;

/// Index of the region segment in a dot-separated identifier
const REGION_SEGMENT: usize = 3;

/// Index of the realm segment in a dot-separated identifier
const REALM_SEGMENT: usize = 2;

/// Prefix of the freeform tag keys that carry per-region key ids
pub const LOOKUP_KEY_PREFIX: &str = "key_";

/// Extract the region code from an identifier.
///
/// Returns the segment at index 3 verbatim (no case folding). Fails with
/// [`Error::MalformedIdentifier`] when the identifier has fewer than four
/// dot-separated segments.
pub fn region_code(identifier: &str) -> Result<&str> {
    segment(identifier, REGION_SEGMENT)
}

/// Extract the realm (e.g., "oc1") from an identifier.
pub fn realm(identifier: &str) -> Result<&str> {
    segment(identifier, REALM_SEGMENT)
}

fn segment(identifier: &str, index: usize) -> Result<&str> {
    let parts: Vec<&str> = identifier.split('.').collect();
    if parts.len() <= REGION_SEGMENT {
        return Err(Error::malformed_identifier(identifier, parts.len()));
    }
    Ok(parts[index])
}

/// Freeform tag key that holds the replacement key id for a region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey {
    region_code: String,
    key: String,
}

impl LookupKey {
    /// Derive the lookup key for a protection group: `"key_" + region code`.
    pub fn for_protection_group(group_id: &str) -> Result<Self> {
        let region_code = region_code(group_id)?;
        Ok(Self::from_region_code(region_code))
    }

    pub fn from_region_code(region_code: &str) -> Self {
        Self {
            region_code: region_code.to_string(),
            key: format!("{}{}", LOOKUP_KEY_PREFIX, region_code),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn region_code(&self) -> &str {
        &self.region_code
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for LookupKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
