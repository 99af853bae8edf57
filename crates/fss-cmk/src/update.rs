//! The update run: credentials, clients, reconciliation

use anyhow::{anyhow, Context, Result};
use fss_cmk_core::{ocid, reconcile, DecisionAction, RunOptions, RunReport, Services};
use fss_cmk_oci::endpoints::realm_domain;
use fss_cmk_oci::{
    ApiKeyCredentials, Credentials, DisasterRecoveryClient, FileStorageClient, IdentityClient,
    InstancePrincipalCredentials, OciClient, OciConfig,
};
use std::sync::Arc;
use tracing::info;

use crate::cli::Cli;

/// Reconcile the protection group named on the command line
pub async fn run(cli: &Cli) -> Result<RunReport> {
    let group_id = cli.dr_protection_group_ocid.as_str();

    // Realm and region come from the identifier, so a malformed one fails
    // before credentials touch the network
    let realm = ocid::realm(group_id).context("Invalid --dr_protection_group_ocid")?;
    ocid::region_code(group_id).context("Invalid --dr_protection_group_ocid")?;
    let domain = realm_domain(realm);

    let credentials = credentials(cli, domain).await?;
    let region = credentials
        .region()
        .map(str::to_string)
        .ok_or_else(|| match &cli.config_file {
            Some(path) => anyhow!(
                "No region set for profile '{}' in {}",
                cli.profile,
                path.display()
            ),
            None => anyhow!("Instance metadata did not report a region"),
        })?;
    info!(
        "Using {} credentials against {} ({})",
        credentials.name(),
        region,
        domain
    );

    let client = OciClient::new(credentials)?;
    let identity = IdentityClient::for_region(client.clone(), &region, domain);
    let disaster_recovery = DisasterRecoveryClient::for_region(client.clone(), &region, domain);
    let file_storage = FileStorageClient::for_region(client, &region, domain);

    let options = RunOptions::new(group_id)
        .with_dry_run(cli.dry_run)
        .with_membership_policy(cli.membership_policy());

    let report = reconcile(
        Services::new(&identity, &disaster_recovery, &file_storage),
        options,
    )
    .await
    .with_context(|| format!("Failed to update file systems of {}", group_id))?;

    log_summary(&report);
    Ok(report)
}

async fn credentials(cli: &Cli, domain: &str) -> Result<Arc<dyn Credentials>> {
    match &cli.config_file {
        Some(path) => {
            let config = OciConfig::from_file(path, &cli.profile)
                .with_context(|| format!("Failed to load profile '{}'", cli.profile))?;
            let credentials = ApiKeyCredentials::from_config(&config)
                .with_context(|| format!("Failed to load API key for profile '{}'", cli.profile))?;
            Ok(Arc::new(credentials))
        }
        None => {
            let credentials = InstancePrincipalCredentials::discover(domain)
                .await
                .context("Failed to obtain instance principal credentials")?;
            Ok(Arc::new(credentials))
        }
    }
}

fn log_summary(report: &RunReport) {
    let applied = report.count(DecisionAction::Apply);
    if report.dry_run {
        info!(
            "Dry run complete: {} to update, {} already set, {} without a key",
            applied,
            report.count(DecisionAction::SkipAlreadySet),
            report.count(DecisionAction::SkipNoKey)
        );
    } else {
        info!(
            "Updated {} file systems, {} already set, {} without a key",
            report.updated(),
            report.count(DecisionAction::SkipAlreadySet),
            report.count(DecisionAction::SkipNoKey)
        );
    }
}
