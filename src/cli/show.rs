use super::{render, ui};
use crate::core::refresh::{Dashboard, RefreshOutcome};
use anyhow::Result;

/// Runs a single refresh and prints the result.
pub async fn run(dashboard: &Dashboard) -> Result<()> {
    let instrument = dashboard.instrument().await;
    let spinner = ui::new_spinner(&format!("Fetching {}...", instrument.name));
    let outcome = dashboard.refresh().await;
    spinner.finish_and_clear();

    render::print_outcome(&outcome);
    match outcome {
        RefreshOutcome::Failed { error, .. } => Err(error.into()),
        _ => Ok(()),
    }
}
