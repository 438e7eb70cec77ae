//! Main entry point for the h2h-ranker service
//!
//! Runs the HTTP ranking service with logging and graceful shutdown, or
//! ranks a single matrix file and prints the scores as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use h2h_ranker::config::AppConfig;
use h2h_ranker::service::{self, AppState, HealthCheck, HealthStatus};
use h2h_ranker::types::{Algorithm, Cell};
use h2h_ranker::RankingEngine;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// h2h-ranker - Head-to-head league ranking service
#[derive(Parser)]
#[command(
    name = "h2h-ranker",
    version,
    about = "Ranks competitors from a head-to-head win/loss matrix",
    long_about = "h2h-ranker turns a square matrix of \"W -- L\" match records into normalized \
                 strength scores using an iterative strength-weighted win rate or a sequential \
                 Elo replay. It serves ranking, validation, CSV export and heatmap routes over HTTP."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Perform a health check and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Rank a matrix file and exit
    #[arg(
        long,
        value_name = "FILE",
        help = "Rank a JSON matrix file ({\"table\": [...]} or a bare array) and print the scores"
    )]
    rank: Option<PathBuf>,

    /// Algorithm used with --rank
    #[arg(
        short,
        long,
        value_name = "NAME",
        default_value = "default",
        help = "Ranking algorithm for --rank (default, elo)"
    )]
    algorithm: String,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Perform health check and return appropriate exit code
async fn perform_health_check(config: AppConfig) -> Result<()> {
    info!("Performing health check...");

    let app_state = Arc::new(AppState::new(config)?);
    app_state.start().await?;

    let result = HealthCheck::check(app_state.clone()).await;
    app_state.shutdown().await?;

    match result {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            for check in &health.checks {
                println!(
                    "  {}: {}{}",
                    check.name,
                    check.status,
                    check
                        .message
                        .as_ref()
                        .map(|m| format!(" ({})", m))
                        .unwrap_or_default()
                );
            }
            println!("  Heatmap endpoint: {}", health.stats.heatmap_endpoint);

            if health.status == HealthStatus::Healthy {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read a matrix file, accepting either `{"table": [...]}` or a bare array
fn read_matrix(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("Matrix file {} is not valid JSON", path.display()))?;

    let table = match value {
        Value::Object(mut object) => object
            .remove("table")
            .ok_or_else(|| anyhow::anyhow!("Matrix file has no \"table\" field"))?,
        other => other,
    };

    serde_json::from_value(table).context("Matrix must be an array of rows")
}

/// Rank one matrix file and print the result
fn rank_file(config: &AppConfig, path: &Path, algorithm: &str) -> Result<()> {
    let algorithm: Algorithm = algorithm.parse()?;
    let table = read_matrix(path)?;
    let engine = RankingEngine::new(config.ranking.clone())?;

    let outcome = engine.compute_with(&table, algorithm)?;
    if !outcome.converged {
        warn!(
            "Ranking stopped at the iteration limit ({} passes)",
            outcome.iterations
        );
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "algorithm": algorithm,
            "ranking": outcome.scores,
            "iterations": outcome.iterations,
            "converged": outcome.converged,
        }))?
    );
    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🚀 h2h-ranker Ranking Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   HTTP: {}:{}",
        config.service.http_host, config.service.http_port
    );
    info!(
        "   Ranking: max_iters={}, tolerance={}, scaling_factor={}",
        config.ranking.max_iters, config.ranking.tolerance, config.ranking.scaling_factor
    );
    info!(
        "   Elo: initial_rating={}, k_factor={}",
        config.ranking.initial_rating, config.ranking.k_factor
    );
    info!(
        "   Heatmap: {} (upload {}, request {})",
        config.heatmap.host, config.heatmap.upload_port, config.heatmap.request_port
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    h2h_ranker::config::validate_config(&config)?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Some(path) = &args.rank {
        return rank_file(&config, path, &args.algorithm);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    let shutdown_timeout = config.shutdown_timeout();

    let exit_code = runtime.block_on(run(&args, config))?;

    // Rankings past their request timeout are still running on blocking threads
    runtime.shutdown_timeout(shutdown_timeout);

    info!("🛑 h2h-ranker stopped");
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

/// Run the selected mode and return the process exit code
async fn run(args: &Args, config: AppConfig) -> Result<i32> {
    if args.health_check {
        perform_health_check(config).await?;
        return Ok(0);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(0);
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            return Ok(1);
        }
    };

    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        return Ok(1);
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(service::serve(app_state.clone(), async move {
        let _ = shutdown_rx.await;
    }));

    info!("✅ h2h-ranker is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    let mut exit_code = 0;
    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("🛑 Shutdown signal received, beginning graceful shutdown...");
            let _ = shutdown_tx.send(());

            let shutdown_timeout = config.shutdown_timeout();
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(Ok(Ok(()))) => info!("HTTP server drained in-flight requests"),
                Ok(Ok(Err(e))) => error!("HTTP server error during shutdown: {}", e),
                Ok(Err(e)) => error!("HTTP server task failed: {}", e),
                Err(_) => {
                    warn!("⚠️  Shutdown timeout exceeded, aborting in-flight requests");
                    server.abort();
                }
            }
        }
        result = &mut server => {
            match result {
                Ok(Ok(())) => warn!("HTTP server stopped unexpectedly"),
                Ok(Err(e)) => error!("HTTP server failed: {}", e),
                Err(e) => error!("HTTP server task failed: {}", e),
            }
            exit_code = 1;
        }
    }

    if let Err(e) = app_state.shutdown().await {
        warn!("Service shutdown reported an error: {}", e);
    }

    Ok(exit_code)
}
