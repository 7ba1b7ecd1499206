//! Error taxonomy for the data-refresh workflow

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// Both the direct request and the relay request failed.
    #[error("Data unavailable from {url}: {reason}")]
    FetchUnavailable { url: String, reason: String },

    /// Malformed numeric string or unexpected response shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No usable historical series for the symbol.
    #[error("No historical data for {0}")]
    NoHistory(String),

    #[error("Invalid {name} rate: {value}")]
    InvalidRate { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
