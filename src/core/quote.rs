//! Market data abstractions and core types

use super::error::{DashboardError, Result};
use super::instrument::Instrument;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest and prior close for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// CLP per USD and CLP per UF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRates {
    usd: f64,
    uf: f64,
}

impl ReferenceRates {
    /// Both rates must be finite and strictly positive; they are used as
    /// conversion denominators.
    pub fn new(usd: f64, uf: f64) -> Result<Self> {
        for (name, value) in [("USD", usd), ("UF", uf)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DashboardError::InvalidRate { name, value });
            }
        }
        Ok(Self { usd, uf })
    }

    pub fn usd(&self) -> f64 {
        self.usd
    }

    pub fn uf(&self) -> f64 {
        self.uf
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Real,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResult {
    pub instrument: Instrument,
    pub quote: Quote,
    pub rates: ReferenceRates,
    pub history: Vec<HistoryPoint>,
    pub provenance: Provenance,
    pub fetched_at: DateTime<Utc>,
}

impl RefreshResult {
    pub fn is_simulated(&self) -> bool {
        self.provenance == Provenance::Simulated
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;

    /// Daily closes for roughly the last `days` days, oldest first.
    async fn fetch_history(&self, symbol: &str, days: u32) -> Result<Vec<HistoryPoint>>;
}

#[async_trait]
pub trait ReferenceRateProvider: Send + Sync {
    async fn fetch_rates(&self) -> Result<ReferenceRates>;
}
