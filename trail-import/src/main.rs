use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use trail_import::logging::init_tracing;
use trail_import::{Cli, Dependencies, ImportConfig, ImportError};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Import failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ImportError> {
    let config = ImportConfig::try_from(cli)?;
    let deps = Dependencies::new(&config).await?;

    let summary = deps.orchestrator.run().await?;
    if summary.failed > 0 {
        info!(failed = summary.failed, "Some archives failed and will be retried on the next run");
    }
    Ok(())
}
