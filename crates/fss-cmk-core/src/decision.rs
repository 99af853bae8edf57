//! Key resolution and update decision
//!
//! A file system is only ever updated when it has no key bound and its
//! freeform tags carry a non-empty key id under the region's lookup key.
//! An existing assignment is never overwritten.

use crate::ocid::LookupKey;
use crate::types::{FileSystemRecord, UpdateDecision};

/// Decide what to do with one file system. Pure; no I/O.
pub fn decide(record: &FileSystemRecord, lookup_key: &LookupKey) -> UpdateDecision {
    if let Some(current) = record.current_key() {
        return UpdateDecision::SkipAlreadySet {
            current_key_id: current.to_string(),
        };
    }

    match record
        .tags
        .get(lookup_key.as_str())
        .filter(|value| !value.is_empty())
    {
        Some(target) => UpdateDecision::Apply {
            target_key_id: target.clone(),
        },
        None => UpdateDecision::SkipNoKey,
    }
}
