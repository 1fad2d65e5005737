// Reminders - headless host for reminder lists and local notifications
// Entry point and application setup

use anyhow::Context;
use reminders::app;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DATA_DIR_ENV: &str = "REMINDERS_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "reminders-data";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reminders=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app_data_dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    // `reminders widget` renders the widget snapshot and exits
    if std::env::args().nth(1).as_deref() == Some("widget") {
        let snapshot = app::widget_snapshot(&app_data_dir)
            .await
            .context("failed to read widget snapshot")?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    tracing::info!("Starting reminders host");

    let state = app::setup(app_data_dir)
        .await
        .context("failed to initialize application")?;

    let totals = state.lists_service.reconcile_all().await;
    tracing::info!(
        "Startup reconcile: {} scheduled, {} skipped, {} cancelled",
        totals.scheduled,
        totals.skipped,
        totals.cancelled
    );

    let mut deliveries = state.gateway.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
            delivery = deliveries.recv() => match delivery {
                Ok(delivery) => tracing::debug!("Delivered {}", delivery.identifier),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {} delivery events", missed)
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    state.lists_service.settle().await;
    state.gateway.shutdown().await?;

    Ok(())
}
