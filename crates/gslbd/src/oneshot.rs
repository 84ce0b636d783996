// # gslb-oneshot - single reconciliation pass
//
// Ticks every configured origin exactly once, in parallel, then exits.
// Useful for cron-driven deployments and for verifying a config against
// the live DNS provider without running the long-lived daemon.

mod wiring;

use clap::Parser;
use gslb_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
enum GslbExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<GslbExitCode> for ExitCode {
    fn from(code: GslbExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "gslb-oneshot", about = "Run one GSLB reconciliation pass and exit")]
struct Args {
    #[arg(short, long)]
    config: PathBuf,

    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return GslbExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            return GslbExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let scheduler = wiring::build_scheduler(&config, args.dry_run)?;
        scheduler.run_once().await.map_err(anyhow::Error::from)
    });

    match result {
        Ok(()) => {
            info!("one-shot reconciliation pass completed");
            GslbExitCode::CleanShutdown.into()
        }
        Err(e) => {
            error!(error = %e, "one-shot reconciliation pass failed");
            GslbExitCode::RuntimeError.into()
        }
    }
}
