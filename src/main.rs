//! dexcli - Command-line trading client
//!
//! Parses one command, runs it against the exchange and prints the result.
//! Logs go to stderr so stdout stays machine-readable.

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use dexcli::adapters::cli;

#[tokio::main]
async fn main() -> ExitCode {
    let app = cli::init();

    if let Err(e) = init_logging(app.verbose, app.debug) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    // Secrets go in .env, never in the config file
    if let Err(e) = cli::load_env_file(app.env_file.as_deref()) {
        eprintln!("Error: {}", e);
        return ExitCode::from(e.exit_code());
    }

    match cli::execute(app).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let default = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
