//! Control-plane service traits
//!
//! The pipeline only talks to these traits; the REST adapters live in
//! `fss-cmk-oci` and tests substitute mocks.

use crate::error::Result;
use crate::types::{FileSystemRecord, ProtectionGroupMember, Region, UpdateResult};
use async_trait::async_trait;

/// Identity control plane
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// List every region known to the control plane
    async fn list_regions(&self) -> Result<Vec<Region>>;
}

/// Disaster-recovery control plane
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DisasterRecoveryService: Send + Sync {
    /// List the members of a protection group, in service order
    async fn list_protection_group_members(
        &self,
        group_id: &str,
    ) -> Result<Vec<ProtectionGroupMember>>;
}

/// File-storage control plane
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorageService: Send + Sync {
    /// Fetch the current state of a file system
    async fn get_file_system(&self, file_system_id: &str) -> Result<FileSystemRecord>;

    /// Bind a file system to a customer-managed key
    async fn update_kms_key(&self, file_system_id: &str, kms_key_id: &str)
        -> Result<UpdateResult>;
}

/// The three collaborators a run needs
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub identity: &'a dyn IdentityService,
    pub disaster_recovery: &'a dyn DisasterRecoveryService,
    pub file_storage: &'a dyn FileStorageService,
}

impl<'a> Services<'a> {
    pub fn new(
        identity: &'a dyn IdentityService,
        disaster_recovery: &'a dyn DisasterRecoveryService,
        file_storage: &'a dyn FileStorageService,
    ) -> Self {
        Self {
            identity,
            disaster_recovery,
            file_storage,
        }
    }
}
