//! Refresh orchestration for a single dashboard session.
//!
//! A cycle moves `Idle -> Fetching -> {Success, Degraded, Failed} -> Idle`.
//! Quote, reference rates and history are fetched concurrently. History is
//! optional unless the strict policy is on: when it is missing the chart is
//! filled with a synthetic series and the cycle is reported as degraded.

use super::error::{DashboardError, Result};
use super::instrument::Instrument;
use super::quote::{
    HistoryPoint, Provenance, Quote, QuoteProvider, ReferenceRateProvider, ReferenceRates,
    RefreshResult,
};
use super::synthetic;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching,
    Success,
    Degraded,
    Failed,
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Updated(RefreshResult),
    /// The cycle failed; `previous` holds the last values shown, if any.
    Failed {
        error: DashboardError,
        previous: Option<RefreshResult>,
    },
    /// Another cycle was already in flight.
    Skipped,
}

impl RefreshOutcome {
    pub fn state(&self) -> RefreshState {
        match self {
            RefreshOutcome::Updated(result) if result.is_simulated() => RefreshState::Degraded,
            RefreshOutcome::Updated(_) => RefreshState::Success,
            RefreshOutcome::Failed { .. } => RefreshState::Failed,
            RefreshOutcome::Skipped => RefreshState::Fetching,
        }
    }
}

struct Session {
    instrument: Instrument,
    days: u32,
    rates: Option<ReferenceRates>,
    last_result: Option<RefreshResult>,
    last_state: RefreshState,
}

pub struct Dashboard {
    quotes: Arc<dyn QuoteProvider>,
    rate_provider: Arc<dyn ReferenceRateProvider>,
    strict_history: bool,
    fallback_rates: Option<ReferenceRates>,
    session: Mutex<Session>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Dashboard {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        rate_provider: Arc<dyn ReferenceRateProvider>,
        instrument: Instrument,
        days: u32,
    ) -> Self {
        Dashboard {
            quotes,
            rate_provider,
            strict_history: false,
            fallback_rates: None,
            session: Mutex::new(Session {
                instrument,
                days,
                rates: None,
                last_result: None,
                last_state: RefreshState::Idle,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fail the cycle instead of synthesizing when live history is missing.
    pub fn with_strict_history(mut self, strict: bool) -> Self {
        self.strict_history = strict;
        self
    }

    /// Rates to use for a cycle when the live rate fetch fails. They are
    /// never cached, so the next cycle tries the live source again.
    pub fn with_fallback_rates(mut self, rates: Option<ReferenceRates>) -> Self {
        self.fallback_rates = rates;
        self
    }

    pub fn state(&self) -> RefreshState {
        if self.in_flight.load(Ordering::Acquire) {
            RefreshState::Fetching
        } else {
            RefreshState::Idle
        }
    }

    /// Terminal state of the last completed cycle.
    pub async fn last_state(&self) -> RefreshState {
        self.session.lock().await.last_state
    }

    pub async fn last_result(&self) -> Option<RefreshResult> {
        self.session.lock().await.last_result.clone()
    }

    pub async fn instrument(&self) -> Instrument {
        self.session.lock().await.instrument.clone()
    }

    pub async fn days(&self) -> u32 {
        self.session.lock().await.days
    }

    /// Switches the tracked instrument. Values retained from the previous
    /// instrument are dropped; the caller triggers the next refresh.
    pub async fn select_instrument(&self, instrument: Instrument) {
        let mut session = self.session.lock().await;
        if session.instrument != instrument {
            debug!(symbol = %instrument.symbol, "Instrument selected");
            session.instrument = instrument;
            session.last_result = None;
        }
    }

    #[instrument(name = "Refresh", skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let (instrument, days) = {
            let session = self.session.lock().await;
            (session.instrument.clone(), session.days)
        };
        self.run_cycle(instrument, days, None).await
    }

    /// Changes the chart period and re-fetches only the history.
    ///
    /// Without live history the series is synthesized from the last known
    /// value. When nothing is retained yet but live history arrives, a full
    /// cycle runs with that history. The new period also applies to later
    /// refreshes, even when this call is skipped or fails.
    #[instrument(name = "SelectPeriod", skip(self))]
    pub async fn select_period(&self, days: u32) -> RefreshOutcome {
        let instrument = {
            let mut session = self.session.lock().await;
            session.days = days;
            session.instrument.clone()
        };

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Refresh already in flight, period applies to the next cycle");
            return RefreshOutcome::Skipped;
        };

        let history = self.quotes.fetch_history(&instrument.symbol, days).await;
        let live = matches!(&history, Ok(points) if points.len() >= 2);
        let previous = self.session.lock().await.last_result.clone();

        let updated = match (history, previous.clone()) {
            (Ok(points), Some(mut result)) if live => {
                result.history = points;
                result.provenance = Provenance::Real;
                Ok(result)
            }
            (Ok(points), None) if live => {
                debug!("No retained values, running a full cycle with the fetched history");
                return self.run_cycle(instrument, days, Some(Ok(points))).await;
            }
            (history, _) if self.strict_history => Err(match history {
                Err(e) => e,
                Ok(_) => DashboardError::NoHistory(instrument.symbol.clone()),
            }),
            (_, Some(mut result)) => {
                debug!("Live history unavailable, synthesizing from last value");
                result.history = synthesize(result.quote.current, days);
                result.provenance = Provenance::Simulated;
                Ok(result)
            }
            (_, None) => Err(DashboardError::NoHistory(instrument.symbol.clone())),
        };

        let mut session = self.session.lock().await;
        let outcome = match updated {
            Ok(result) => {
                if session.instrument == result.instrument {
                    session.last_result = Some(result.clone());
                }
                RefreshOutcome::Updated(result)
            }
            Err(error) => {
                warn!(error = %error, "Period change failed");
                RefreshOutcome::Failed { error, previous }
            }
        };
        session.last_state = outcome.state();
        outcome
    }

    /// One fetch cycle. The caller holds the in-flight guard. History that
    /// was already fetched is reused instead of being requested again.
    async fn run_cycle(
        &self,
        instrument: Instrument,
        days: u32,
        fetched_history: Option<Result<Vec<HistoryPoint>>>,
    ) -> RefreshOutcome {
        let cached_rates = self.session.lock().await.rates;
        info!(symbol = %instrument.symbol, days, "Refreshing market data");

        let rates_fut = async {
            match cached_rates {
                Some(rates) => Ok((rates, false)),
                None => self.load_rates().await,
            }
        };
        let history_fut = async {
            match fetched_history {
                Some(history) => history,
                None => self.quotes.fetch_history(&instrument.symbol, days).await,
            }
        };
        let (quote, rates, history) = tokio::join!(
            self.quotes.fetch_quote(&instrument.symbol),
            rates_fut,
            history_fut,
        );

        let assembled = self.assemble(instrument, days, quote, rates, history);

        let mut session = self.session.lock().await;
        let outcome = match assembled {
            Ok((result, rates_to_cache)) => {
                if let Some(rates) = rates_to_cache {
                    session.rates = Some(rates);
                }
                // The instrument may have been switched while fetching.
                if session.instrument == result.instrument {
                    session.last_result = Some(result.clone());
                }
                RefreshOutcome::Updated(result)
            }
            Err(error) => {
                warn!(error = %error, "Refresh failed");
                RefreshOutcome::Failed {
                    error,
                    previous: session.last_result.clone(),
                }
            }
        };
        session.last_state = outcome.state();
        info!(state = ?session.last_state, "Refresh finished");
        outcome
    }

    /// Returns the rates and, when they came from the live source, the value
    /// to cache for the session.
    async fn load_rates(&self) -> Result<(ReferenceRates, bool)> {
        match self.rate_provider.fetch_rates().await {
            Ok(rates) => Ok((rates, true)),
            Err(e) => match self.fallback_rates {
                Some(fallback) => {
                    warn!(error = %e, "Reference rates unavailable, using fallback rates");
                    Ok((fallback, false))
                }
                None => Err(e),
            },
        }
    }

    fn assemble(
        &self,
        instrument: Instrument,
        days: u32,
        quote: Result<Quote>,
        rates: Result<(ReferenceRates, bool)>,
        history: Result<Vec<HistoryPoint>>,
    ) -> Result<(RefreshResult, Option<ReferenceRates>)> {
        let quote = quote?;
        let (rates, live_rates) = rates?;

        let (history, provenance) = match history {
            Ok(points) if points.len() >= 2 => (points, Provenance::Real),
            Ok(_) if self.strict_history => {
                return Err(DashboardError::NoHistory(instrument.symbol));
            }
            Err(e) if self.strict_history => return Err(e),
            other => {
                if let Err(e) = other {
                    warn!(error = %e, "History unavailable, using simulated data");
                } else {
                    debug!("Too few history points, using simulated data");
                }
                (synthesize(quote.current, days), Provenance::Simulated)
            }
        };

        let result = RefreshResult {
            instrument,
            quote,
            rates,
            history,
            provenance,
            fetched_at: Utc::now(),
        };
        Ok((result, live_rates.then_some(rates)))
    }
}

fn synthesize(current: f64, days: u32) -> Vec<HistoryPoint> {
    let points = synthetic::generate_history(current, days, Utc::now(), &mut rand::rng());
    debug!(points = points.len(), "Generated simulated history");
    points
}
