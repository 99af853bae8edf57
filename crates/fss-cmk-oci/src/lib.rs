//! OCI control-plane adapters for fss-cmk
//!
//! This crate provides:
//! - **Config profiles**: `~/.oci/config`-style INI files with DEFAULT inheritance
//! - **Request signing**: RSA-SHA256 HTTP signatures with API keys or
//!   instance-principal session tokens
//! - **REST clients**: identity, disaster recovery and file storage, each
//!   implementing the matching `fss-cmk-core` service trait

pub mod auth;
pub mod client;
pub mod config;
pub mod disaster_recovery;
pub mod endpoints;
pub mod file_storage;
pub mod identity;

pub use auth::{ApiKeyCredentials, Credentials, InstancePrincipalCredentials, SigningMaterial};
pub use client::{ApiResponse, OciClient};
pub use config::{OciConfig, DEFAULT_PROFILE};
pub use disaster_recovery::DisasterRecoveryClient;
pub use file_storage::FileStorageClient;
pub use identity::IdentityClient;
