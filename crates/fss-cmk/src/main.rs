//! fss-update-cmk - re-assign customer-managed keys after a DR failover
//!
//! Reads the file-system members of a disaster-recovery protection group and
//! assigns each one the key OCID stored in its `key_<region>` freeform tag,
//! unless the file system already has a key.

mod cli;
mod logging;
mod update;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init_tracing(cli.verbose, cli.quiet);

    match update::run(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
