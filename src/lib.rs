pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{Dashboard, Instrument, ReferenceRates};
use crate::providers::cmf::CmfRateProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use crate::providers::FallbackClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Show {
        symbol: Option<String>,
        days: Option<u32>,
    },
    Watch {
        symbol: Option<String>,
        days: Option<u32>,
    },
    Symbols,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ipsatrack starting...");

    let (symbol, days, watch) = match command {
        AppCommand::Symbols => {
            cli::symbols::run();
            return Ok(());
        }
        AppCommand::Show { symbol, days } => (symbol, days, false),
        AppCommand::Watch { symbol, days } => (symbol, days, true),
    };

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().context("No configuration found, run `ipsatrack setup` first")?,
    };
    debug!("Loaded config: {config:#?}");

    let dashboard = build_dashboard(&config, symbol.as_deref(), days)?;
    if watch {
        cli::watch::run(Arc::new(dashboard)).await
    } else {
        cli::show::run(&dashboard).await
    }
}

/// Wires providers and session settings from the config. Command line
/// values take precedence over the configured symbol and period.
pub fn build_dashboard(
    config: &AppConfig,
    symbol: Option<&str>,
    days: Option<u32>,
) -> Result<Dashboard> {
    let symbol = symbol.unwrap_or(&config.symbol);
    let instrument = Instrument::lookup(symbol).with_context(|| {
        format!("Unknown symbol: {symbol}. Run `ipsatrack symbols` to list instruments")
    })?;

    let days = days.unwrap_or(config.days);
    if days == 0 {
        anyhow::bail!("The chart period must be at least one day");
    }

    let cmf = config
        .providers
        .cmf
        .as_ref()
        .context("Missing providers.cmf configuration; a CMF API key is required")?;

    let client = FallbackClient::new(config.relay_base_url())?;
    let quotes = YahooFinanceProvider::new(config.yahoo_base_url(), client.clone());
    let rates = CmfRateProvider::new(&cmf.base_url, &cmf.api_key, client);

    let fallback_rates = config
        .fallback_rates
        .map(|f| ReferenceRates::new(f.usd, f.uf))
        .transpose()
        .context("Invalid fallback_rates in configuration")?;

    Ok(
        Dashboard::new(Arc::new(quotes), Arc::new(rates), instrument, days)
            .with_strict_history(config.strict_history)
            .with_fallback_rates(fallback_rates),
    )
}
