// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rota Daemon (rotad)
//!
//! Background process that reconciles declared schedules onto a
//! persistent scheduler runtime and fires their tasks.

use std::sync::Arc;

use rota_core::{LifecycleEvent, SystemClock};
use rota_daemon::lifecycle::{self, Config, LifecycleError};
use rota_runtime::NullEngine;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config handling
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("rotad {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("rotad {}", env!("CARGO_PKG_VERSION"));
                println!("Rota Daemon - fires declared schedules against the task engine");
                println!();
                println!("USAGE:");
                println!("    rotad");
                println!();
                println!("Schedules are read from the schedules document under the state");
                println!("directory ($ROTA_STATE_DIR, $XDG_STATE_HOME/rota, or");
                println!("~/.local/state/rota). Send SIGTERM or SIGINT to shut down");
                println!("gracefully; send it twice to abandon in-flight jobs.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: rotad [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let log_guard = setup_logging(&config)?;

    info!("starting rotad {}", env!("CARGO_PKG_VERSION"));

    let (mut daemon, events) =
        match lifecycle::startup(&config, Arc::new(NullEngine), Arc::new(SystemClock)) {
            Ok(r) => r,
            Err(e) => {
                error!("failed to start daemon: {}", e);
                drop(log_guard);
                return Err(e.into());
            }
        };

    spawn_signal_handler(events)?;

    daemon.run().await?;
    Ok(())
}

/// First SIGTERM/SIGINT requests a graceful shutdown; a second signal
/// abandons in-flight jobs.
fn spawn_signal_handler(events: mpsc::Sender<LifecycleEvent>) -> Result<(), std::io::Error> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        let mut requested = false;
        loop {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
            let event = if requested {
                info!("second shutdown signal received");
                LifecycleEvent::ShutdownFinal
            } else {
                info!("shutdown signal received");
                requested = true;
                LifecycleEvent::ShutdownRequested
            };
            if events.send(event).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
