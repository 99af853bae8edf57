//! Reconciliation pipeline
//!
//! Linear and sequential: derive the lookup key, resolve regions, fetch the
//! file-system members, then for each member fetch, decide and (maybe)
//! update. Members are visited exactly once, in the order the
//! disaster-recovery service returned them.

use crate::decision::decide;
use crate::error::Result;
use crate::executor::apply;
use crate::membership::{fetch_file_system_members, MembershipError};
use crate::ocid::LookupKey;
use crate::resolver::resolve_regions;
use crate::services::Services;
use crate::types::{DecisionAction, FileSystemRecord, MemberOutcome, RegionMap, UpdateDecision};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use tracing::{info, info_span, warn, Instrument, Span};

/// What a failed membership fetch means for the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MembershipErrorPolicy {
    /// Log the reason and continue as if the group had no file systems
    #[default]
    Continue,
    /// Fail the run
    Abort,
}

/// Caller-supplied options for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Protection group whose file-system members are reconciled
    pub group_id: String,
    /// Compute and log decisions without issuing updates
    pub dry_run: bool,
    pub membership_policy: MembershipErrorPolicy,
}

impl RunOptions {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            dry_run: false,
            membership_policy: MembershipErrorPolicy::default(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_membership_policy(mut self, policy: MembershipErrorPolicy) -> Self {
        self.membership_policy = policy;
        self
    }
}

/// Run-scoped state threaded through every step
#[derive(Debug)]
pub struct RunContext {
    pub group_id: String,
    pub lookup_key: LookupKey,
    pub regions: RegionMap,
    pub started_at: DateTime<Local>,
    pub span: Span,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub dry_run: bool,
    /// Reason of a swallowed membership fetch failure
    pub membership_error: Option<String>,
    pub outcomes: Vec<MemberOutcome>,
}

impl RunReport {
    /// Wall-clock duration rounded to two decimals
    pub fn elapsed_seconds(&self) -> f64 {
        let millis = (self.finished_at - self.started_at).num_milliseconds() as f64;
        (millis / 10.0).round() / 100.0
    }

    /// Number of members that ended with `action`
    pub fn count(&self, action: DecisionAction) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.decision.action() == action)
            .count()
    }

    /// Number of updates actually issued
    pub fn updated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_some()).count()
    }
}

/// Reconcile CMK assignments for every file system in a protection group.
///
/// The lookup key is derived before any remote call, so a malformed group
/// identifier fails without touching the network.
pub async fn reconcile(services: Services<'_>, options: RunOptions) -> Result<RunReport> {
    let started_at = Local::now();
    info!("Execution Start Date - [{}]", started_at.format("%Y-%m-%d %H:%M:%S%.6f"));

    let lookup_key = LookupKey::for_protection_group(&options.group_id)?;
    let regions = resolve_regions(services.identity).await?;

    let ctx = RunContext {
        span: info_span!("reconcile", group = %options.group_id),
        group_id: options.group_id.clone(),
        lookup_key,
        regions,
        started_at,
    };

    let (outcomes, membership_error) = visit_members(&ctx, services, &options)
        .instrument(ctx.span.clone())
        .await?;

    let report = RunReport {
        started_at: ctx.started_at,
        finished_at: Local::now(),
        dry_run: options.dry_run,
        membership_error,
        outcomes,
    };

    info!(
        "Execution End Date - [{}]",
        report.finished_at.format("%Y-%m-%d %H:%M:%S%.6f")
    );
    info!("Total Execution Time - [{:.2}] seconds", report.elapsed_seconds());

    Ok(report)
}

async fn visit_members(
    ctx: &RunContext,
    services: Services<'_>,
    options: &RunOptions,
) -> Result<(Vec<MemberOutcome>, Option<String>)> {
    report_region(ctx);

    let (members, membership_error) =
        match fetch_file_system_members(services.disaster_recovery, &ctx.group_id).await {
            Ok(members) => (members, None),
            Err(err) => handle_membership_error(err, options.membership_policy)?,
        };

    if members.is_empty() {
        info!("No File Systems found in DRProtectionGroup");
    } else {
        info!("File Systems count in DRProtectionGroup {}", members.len());
        info!(
            "List of File Systems in DRProtectionGroup: [{}]",
            members.join(", ")
        );
    }

    let mut outcomes = Vec::with_capacity(members.len());
    for file_system_id in &members {
        let record = services.file_storage.get_file_system(file_system_id).await?;
        outcomes.push(process_member(ctx, services, record, options.dry_run).await?);
    }

    Ok((outcomes, membership_error))
}

fn report_region(ctx: &RunContext) {
    let code = ctx.lookup_key.region_code();
    match ctx.regions.name_for_code(code) {
        Some(name) => info!(
            "Protection group region [{}] is [{}], looking up freeform tag [{}]",
            code, name, ctx.lookup_key
        ),
        None => warn!(
            "Region code [{}] from the protection group is not among the {} listed regions, \
             looking up freeform tag [{}]",
            code,
            ctx.regions.len(),
            ctx.lookup_key
        ),
    }
}

fn handle_membership_error(
    err: MembershipError,
    policy: MembershipErrorPolicy,
) -> Result<(Vec<String>, Option<String>)> {
    match policy {
        MembershipErrorPolicy::Continue => {
            warn!("{}", err);
            Ok((Vec::new(), Some(err.reason)))
        }
        MembershipErrorPolicy::Abort => Err(err.source),
    }
}

async fn process_member(
    ctx: &RunContext,
    services: Services<'_>,
    record: FileSystemRecord,
    dry_run: bool,
) -> Result<MemberOutcome> {
    let decision = decide(&record, &ctx.lookup_key);

    let result = match &decision {
        UpdateDecision::Apply { target_key_id } if dry_run => {
            info!(
                "Dry run: would update the file system [{}] - [{}] with the new CMK with kmsKeyId [{}]",
                record.display_name, record.id, target_key_id
            );
            None
        }
        UpdateDecision::Apply { target_key_id } => {
            info!(
                "Updating the file system [{}] - [{}] with the new CMK with kmsKeyId [{}]",
                record.display_name, record.id, target_key_id
            );
            let result = apply(services.file_storage, &record.id, target_key_id).await?;
            info!("{}", result);
            Some(result)
        }
        UpdateDecision::SkipAlreadySet { current_key_id } => {
            info!(
                "Skipping Update of the file system [{}] - [{}] as CMK already exists with kmsKeyId [{}]",
                record.display_name, record.id, current_key_id
            );
            None
        }
        UpdateDecision::SkipNoKey => {
            let tags: BTreeMap<&str, &str> = record
                .tags
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            info!(
                "Skipping Update of the file system [{}] - [{}] as Key not found in Freeform Tags list {:?}",
                record.display_name, record.id, tags
            );
            None
        }
    };

    Ok(MemberOutcome {
        file_system_id: record.id,
        display_name: record.display_name,
        decision,
        result,
    })
}
