use super::{render, ui};
use crate::core::refresh::{Dashboard, RefreshOutcome};
use crate::core::schedule::{REFRESH_INTERVAL, spawn_periodic_refresh};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Refreshes on a fixed interval until Ctrl-C.
pub async fn run(dashboard: Arc<Dashboard>) -> Result<()> {
    let instrument = dashboard.instrument().await;
    println!(
        "Watching {} ({}), refreshing every {} minutes. Press Ctrl-C to stop.",
        ui::style_text(&instrument.name, ui::StyleType::Title),
        instrument.description,
        REFRESH_INTERVAL.as_secs() / 60
    );

    let handle = spawn_periodic_refresh(dashboard, REFRESH_INTERVAL, |outcome: RefreshOutcome| {
        if !matches!(outcome, RefreshOutcome::Skipped) {
            ui::print_separator();
        }
        render::print_outcome(&outcome);
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Interrupt received, stopping");
    handle.shutdown().await;
    Ok(())
}
