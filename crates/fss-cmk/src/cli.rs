//! CLI argument parsing with clap

use clap::Parser;
use fss_cmk_core::MembershipErrorPolicy;
use std::path::PathBuf;

/// Re-assign customer-managed keys to the file systems of a DR protection
/// group after failover or switchover.
///
/// Each file system carries its per-region key OCIDs in freeform tags named
/// `key_<region code>`; the key matching the protection group's region is
/// applied to every file system that does not already have one.
#[derive(Parser, Debug)]
#[command(name = "fss-update-cmk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// OCID of the DR protection group in the region being activated
    #[arg(long = "dr_protection_group_ocid", value_name = "OCID")]
    pub dr_protection_group_ocid: String,

    /// OCI config file; instance-principal credentials are used when omitted
    #[arg(long = "config_file", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Profile to read from the config file
    #[arg(long, default_value = fss_cmk_oci::DEFAULT_PROFILE)]
    pub profile: String,

    /// Log the decisions without updating any file system
    #[arg(long = "dry_run")]
    pub dry_run: bool,

    /// Fail when the protection group members cannot be fetched
    #[arg(long = "fail_on_membership_error")]
    pub fail_on_membership_error: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn membership_policy(&self) -> MembershipErrorPolicy {
        if self.fail_on_membership_error {
            MembershipErrorPolicy::Abort
        } else {
            MembershipErrorPolicy::Continue
        }
    }
}
