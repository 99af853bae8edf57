//! Data model shared by the pipeline and the service adapters
//!
//! Field renames follow the control-plane wire format so adapters can
//! deserialize responses straight into these types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A deployment region as listed by the identity control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region name (e.g., "us-ashburn-1")
    pub name: String,

    /// Short region code (e.g., "IAD")
    #[serde(rename = "key")]
    pub code: String,
}

/// Mapping of region name to region code, fetched once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionMap {
    by_name: BTreeMap<String, String>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region: Region) {
        self.by_name.insert(region.name, region.code);
    }

    /// Region code for a region name
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Region name for a region code, compared case-insensitively since
    /// identifiers carry codes in lower case while the listing uses upper case
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, c)| c.eq_ignore_ascii_case(code))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<Region> for RegionMap {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut map = RegionMap::new();
        for region in iter {
            map.insert(region);
        }
        map
    }
}

/// Kind of resource enrolled in a protection group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    ComputeInstance,
    ComputeInstanceMovable,
    ComputeInstanceNonMovable,
    VolumeGroup,
    Database,
    AutonomousDatabase,
    AutonomousContainerDatabase,
    LoadBalancer,
    NetworkLoadBalancer,
    FileSystem,
    ObjectStorageBucket,
    OkeCluster,
    MysqlDbSystem,
    IntegrationInstance,
    /// Member kind not known to this build
    #[serde(other)]
    Unknown,
}

/// A resource enrolled in a protection group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionGroupMember {
    pub member_id: String,
    pub member_type: MemberType,
}

impl ProtectionGroupMember {
    pub fn is_file_system(&self) -> bool {
        self.member_type == MemberType::FileSystem
    }
}

/// Snapshot of a file system's key assignment and freeform tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemRecord {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    /// Customer-managed key currently bound to the file system
    #[serde(rename = "kmsKeyId", default)]
    pub current_key_id: Option<String>,

    /// Freeform tags
    #[serde(rename = "freeformTags", default)]
    pub tags: HashMap<String, String>,
}

impl FileSystemRecord {
    /// Current key id, treating an empty string as absent
    pub fn current_key(&self) -> Option<&str> {
        self.current_key_id.as_deref().filter(|k| !k.is_empty())
    }
}

/// What to do with one file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// Bind the file system to `target_key_id`
    Apply { target_key_id: String },
    /// A key is already bound; never overwritten
    SkipAlreadySet { current_key_id: String },
    /// No replacement key in the tags for this region
    SkipNoKey,
}

impl UpdateDecision {
    pub fn action(&self) -> DecisionAction {
        match self {
            UpdateDecision::Apply { .. } => DecisionAction::Apply,
            UpdateDecision::SkipAlreadySet { .. } => DecisionAction::SkipAlreadySet,
            UpdateDecision::SkipNoKey => DecisionAction::SkipNoKey,
        }
    }

    pub fn target_key_id(&self) -> Option<&str> {
        match self {
            UpdateDecision::Apply { target_key_id } => Some(target_key_id),
            _ => None,
        }
    }
}

/// Decision discriminant, used for reporting and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionAction {
    Apply,
    SkipAlreadySet,
    SkipNoKey,
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionAction::Apply => "APPLY",
            DecisionAction::SkipAlreadySet => "SKIP_ALREADY_SET",
            DecisionAction::SkipNoKey => "SKIP_NO_KEY",
        };
        f.write_str(s)
    }
}

/// Response of the key update call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    #[serde(rename = "id")]
    pub file_system_id: String,

    /// Key reported on the resource after the update
    #[serde(default)]
    pub kms_key_id: Option<String>,

    #[serde(default)]
    pub lifecycle_state: Option<String>,

    /// Request id echoed by the control plane, when present
    #[serde(skip)]
    pub request_id: Option<String>,
}

impl fmt::Display for UpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} kmsKeyId={} lifecycleState={} opcRequestId={}",
            self.file_system_id,
            self.kms_key_id.as_deref().unwrap_or("-"),
            self.lifecycle_state.as_deref().unwrap_or("-"),
            self.request_id.as_deref().unwrap_or("-"),
        )
    }
}

/// Per-member result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOutcome {
    pub file_system_id: String,
    pub display_name: String,
    pub decision: UpdateDecision,
    /// Present only when the update was actually issued
    pub result: Option<UpdateResult>,
}
