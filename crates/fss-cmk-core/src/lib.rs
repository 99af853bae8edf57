//! # fss-cmk-core
//!
//! Core library for the fss-cmk reconciliation utility providing:
//! - Type definitions for regions, protection-group members and file systems
//! - Protection-group identifier parsing and lookup-key derivation
//! - The per-member update decision engine
//! - Service traits for the identity, disaster-recovery and file-storage
//!   control planes, and the linear pipeline that drives them

pub mod decision;
pub mod error;
pub mod executor;
pub mod membership;
pub mod ocid;
pub mod pipeline;
pub mod resolver;
pub mod services;
pub mod types;

pub use decision::decide;
pub use error::{Error, Result};
pub use executor::apply;
pub use membership::{fetch_file_system_members, MembershipError};
pub use ocid::LookupKey;
pub use pipeline::{reconcile, MembershipErrorPolicy, RunContext, RunOptions, RunReport};
pub use resolver::resolve_regions;
pub use services::{DisasterRecoveryService, FileStorageService, IdentityService, Services};
pub use types::{
    DecisionAction, FileSystemRecord, MemberOutcome, MemberType, ProtectionGroupMember, Region,
    RegionMap, UpdateDecision, UpdateResult,
};
