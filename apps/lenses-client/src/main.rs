//! Lenses Command Line Client
//!
//! Runs live SQL queries and administers quotas on a Lenses server.
//!
//! # Usage
//!
//! ```bash
//! lenses query "SELECT * FROM orders" --live
//! lenses quotas --json
//! lenses quota users set --quota-user bob --quota-config '{"producer_byte_rate":"100000"}'
//! lenses quota clients delete --quota-client app request_percentage
//! ```
//!
//! # Environment Variables
//!
//! ## Required (or `--host` / `--token`)
//! - `LENSES_HOST`: Server URL, e.g. `https://lenses.example.com`
//! - `LENSES_TOKEN`: Session token
//!
//! ## Optional
//! - `LENSES_TIMEOUT_SECS`: REST request timeout (default: 30)
//! - `LENSES_HANDSHAKE_TIMEOUT_SECS`: WebSocket handshake timeout (default: 45)
//! - `LENSES_READ_BUFFER_SIZE` / `LENSES_WRITE_BUFFER_SIZE`: Transport buffers
//! - `LENSES_ERROR_BUFFER`: Error channel capacity (default: 1)
//! - `LENSES_METRICS_PORT`: Serve Prometheus metrics on this port
//! - `OTEL_ENABLED`: Export traces over OTLP (default: false)
//! - `RUST_LOG`: Log filter (default: warn, debug with `--debug`)

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lenses_client::infrastructure::cli::{
    Cli, Command, SharedWriter, run_list, run_query, run_quota,
};
use lenses_client::infrastructure::telemetry;
use lenses_client::{
    ClientConfig, LensesHttpClient, LiveConnection, QuotaCommands, TelemetryConfig, init_metrics,
};
use parking_lot::Mutex;
use tokio::signal;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    load_dotenv();

    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    let _telemetry_guard =
        telemetry::init_with_config(TelemetryConfig::from_env().with_level(level));

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = ClientConfig::from_env(cli.host.clone(), cli.token.clone())?;
    log_config(&config);

    if let Some(port) = config.metrics_port
        && let Err(e) = init_metrics(port)
    {
        tracing::warn!(port, error = %e, "Failed to start metrics exporter");
    }

    match cli.command {
        Command::Query(args) => {
            let mut live = config
                .live_config(args.sql)
                .with_live(args.live)
                .with_stats(args.stats);
            live.debug = cli.debug;

            let conn = LiveConnection::open(live).await?;
            let out: SharedWriter = Arc::new(Mutex::new(std::io::stdout()));
            let err: SharedWriter = Arc::new(Mutex::new(std::io::stderr()));

            let report = run_query(&conn, out, err, await_shutdown()).await?;
            tracing::info!(
                session = %conn.id(),
                records = report.records,
                failed = report.failed,
                "Query complete"
            );

            Ok(if report.failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Quotas(args) => {
            let commands = QuotaCommands::new(LensesHttpClient::new(&config.rest_config())?);
            run_list(&commands, &args, &mut std::io::stdout()).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Quota { scope } => {
            let commands = QuotaCommands::new(LensesHttpClient::new(&config.rest_config())?);
            let message = run_quota(&commands, scope).await?;
            if !cli.silent {
                println!("{message}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn log_config(config: &ClientConfig) {
    tracing::debug!(
        host = %config.host,
        timeout_secs = config.timeout.as_secs(),
        handshake_timeout_secs = config.session.handshake_timeout.as_secs(),
        error_buffer = config.session.error_buffer,
        metrics_port = ?config.metrics_port,
        "Configuration loaded"
    );
}

/// Load `.env` from the working directory or the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn await_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, closing session");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, closing session");
        }
    }
}
