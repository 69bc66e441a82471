// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flume-spool - spool stdin through a disk-backed segment queue

mod args;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use spool_core::{EventBus, EventReceiver, Spool, SpoolEvent};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = cli.spool_config()?;

    let bus = EventBus::new();
    let events = bus.set_global_handler();
    let logger = tokio::spawn(log_events(events));

    let spool = Spool::start(&config, bus).context("failed to start spool")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                // One write per line so a rotation never splits it
                Ok(Some(line)) => spool.write_str(&format!("{line}\n")),
                Ok(None) => {
                    if !cli.linger.is_zero() {
                        tracing::info!(linger = ?cli.linger, "stdin closed, lingering");
                        tokio::select! {
                            _ = tokio::time::sleep(cli.linger) => {}
                            _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
                        }
                    }
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read stdin");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    spool.shutdown().await;
    // The logger ends once every bus handle is gone
    if let Err(e) = logger.await {
        tracing::warn!(error = %e, "event logger failed");
    }
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn log_events(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match event {
            SpoolEvent::Open { segment } => {
                tracing::info!(segment = %segment.display(), "spool open")
            }
            SpoolEvent::Transfer => tracing::debug!("transfer cycle finished"),
            SpoolEvent::Error { kind, message } => tracing::warn!(%kind, "{}", message),
            SpoolEvent::Close => tracing::info!("spool closed"),
        }
    }
}
