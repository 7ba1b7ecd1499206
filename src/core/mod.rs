//! Core business logic abstractions

pub mod calc;
pub mod config;
pub mod display;
pub mod error;
pub mod instrument;
pub mod locale;
pub mod log;
pub mod quote;
pub mod refresh;
pub mod schedule;
pub mod synthetic;

// Re-export main types for cleaner imports
pub use error::DashboardError;
pub use instrument::Instrument;
pub use quote::{
    HistoryPoint, Provenance, Quote, QuoteProvider, ReferenceRateProvider, ReferenceRates,
    RefreshResult,
};
pub use refresh::{Dashboard, RefreshOutcome, RefreshState};
