// # gslbd - GSLB reconciliation daemon
//
// Thin integration layer: parses CLI args, loads and validates config,
// wires concrete collaborators (Cloudflare gateway, HTTP/ICMP probes,
// Slack/Discord notifiers) from it, and drives the scheduler until a
// shutdown signal arrives. All reconciliation logic lives in `gslb-core`.

mod wiring;

use clap::Parser;
use gslb_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes follow systemd conventions: 0 clean, 1 config error, 2 runtime error.
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
#[command(name = "gslbd", about = "DNS-based global server load balancer daemon")]
struct Args {
    /// Path to the GSLB config file (JSON).
    #[arg(short, long)]
    config: PathBuf,

    /// Log everything the gateway would do without mutating DNS records.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return GslbExitCode::ConfigError.into();
        }
    };

    info!(origins = config.origins.len(), zones = config.zones.len(), "configuration loaded");

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            return GslbExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run_daemon(config, args.dry_run));

    match result {
        Ok(()) => GslbExitCode::CleanShutdown.into(),
        Err(e) => {
            error!(error = %e, "daemon error");
            GslbExitCode::RuntimeError.into()
        }
    }
}

async fn run_daemon(config: gslb_core::Config, dry_run: bool) -> anyhow::Result<()> {
    let scheduler = wiring::build_scheduler(&config, dry_run)?;

    let cancel = CancellationToken::new();
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received, stopping reconcilers");
        shutdown_cancel.cancel();
    });

    info!("gslbd ready, entering reconciliation loop");
    scheduler.run_daemon(cancel).await?;
    info!("all reconcilers stopped, exiting");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
