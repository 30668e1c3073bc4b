//! Playout Scheduler (playout) - Main entry point
//!
//! Loads the bootstrap configuration, builds the renderer registry, player,
//! content source manager and control router, then runs until Ctrl+C or
//! SIGTERM. Control requests are read line by line from stdin as
//! `<route> [json params]`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use playout_common::PlayoutEvent;
use playout_sched::{ContentSourceManager, ControlRouter, Player, PlayoutConfig, RefillDecision};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long startup waits for the initial refill before starting the queue
const INITIAL_REFILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-line arguments for playout
#[derive(Parser, Debug)]
#[command(name = "playout")]
#[command(about = "Content playout scheduler")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "PLAYOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides the configuration file)
    #[arg(short, long, env = "PLAYOUT_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlayoutConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing: RUST_LOG > --log-level > config file
    let level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting playout scheduler v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Timer resolution {} ms, {} renderer(s), {} source(s)",
        config.timer_resolution_ms,
        config.renderers.len(),
        config.sources.len()
    );

    let player = Player::new(config.renderer_registry(), config.player_settings())
        .context("Failed to initialize player")?;

    let manager = ContentSourceManager::new(player.clone(), config.auto_pool, config.event_capacity);
    for source in &config.sources {
        manager
            .add_source(source.build())
            .with_context(|| format!("Failed to register source '{}'", source.name()))?;
    }

    let router = ControlRouter::new(player.clone(), manager.clone());
    info!("Control routes: {}", router.routes().join(", "));

    tokio::spawn(log_events("player", player.subscribe()));
    tokio::spawn(log_events("sources", manager.subscribe()));

    // Fill the queue before anything goes on air; subscribe first so the
    // completion cannot be missed
    let mut pool_events = manager.subscribe();
    if let RefillDecision::Started { pulls } = manager.evaluate_refill().await {
        info!("Waiting for initial refill ({} pull(s))", pulls);
        let waited = tokio::time::timeout(INITIAL_REFILL_TIMEOUT, wait_for_refill(&mut pool_events)).await;
        if waited.is_err() {
            warn!("Initial refill still running after {:?}", INITIAL_REFILL_TIMEOUT);
        }
    }
    drop(pool_events);

    manager.start();

    player.go_on_air().await;

    tokio::select! {
        _ = control_console(&router) => {
            info!("Control input closed");
            shutdown_signal().await;
        }
        _ = shutdown_signal() => {}
    }

    manager.stop();
    info!("Playout scheduler stopped");
    Ok(())
}

async fn wait_for_refill(rx: &mut broadcast::Receiver<PlayoutEvent>) {
    loop {
        match rx.recv().await {
            Ok(PlayoutEvent::RefillCompleted { .. }) => return,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

/// Log every event of one bus until it closes
async fn log_events(bus: &'static str, mut rx: broadcast::Receiver<PlayoutEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => debug!(bus, "{}", json),
                Err(e) => warn!(bus, "Cannot serialize {}: {}", event.event_type(), e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(bus, "Event logger lagged by {} event(s)", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Read `<route> [json]` lines from stdin and print each result
async fn control_console(router: &ControlRouter) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                error!("Failed to read control input: {}", e);
                return;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (route, raw_params) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let params = if raw_params.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(raw_params) {
                Ok(value) => value,
                Err(e) => {
                    println!("{}", serde_json::json!({ "error": format!("Invalid JSON: {}", e) }));
                    continue;
                }
            }
        };

        match router.dispatch(route, params).await {
            Ok(result) => println!("{}", serde_json::json!({ "ok": result })),
            Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
