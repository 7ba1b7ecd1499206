use crate::core::error::{DashboardError, Result};
use crate::core::quote::{HistoryPoint, Quote, QuoteProvider};
use crate::providers::relay::FallbackClient;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Chart range wide enough to cover `days` daily closes.
fn range_for_days(days: u32) -> &'static str {
    match days {
        0..=7 => "5d",
        8..=30 => "1mo",
        31..=90 => "3mo",
        _ => "6mo",
    }
}

fn extract_history(item: &PriceChartItem, days: u32) -> Vec<HistoryPoint> {
    let Some(timestamps) = item.timestamp.as_ref() else {
        return Vec::new();
    };
    let Some(closes) = item
        .indicators
        .as_ref()
        .and_then(|inds| inds.quote.first())
        .and_then(|q| q.close.as_ref())
    else {
        return Vec::new();
    };

    let mut points: Vec<HistoryPoint> = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let value = (*close).filter(|v| v.is_finite())?;
            let timestamp = Utc.timestamp_opt(*ts, 0).single()?;
            Some(HistoryPoint { timestamp, value })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);

    let keep = days as usize;
    if points.len() > keep {
        points.drain(..points.len() - keep);
    }
    points
}

pub struct YahooFinanceProvider {
    base_url: String,
    client: FallbackClient,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, client: FallbackClient) -> Self {
        YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn chart_url(&self, symbol: &str, range: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url, symbol, range
        )
    }

    async fn fetch_chart(&self, symbol: &str, range: &str) -> Result<Option<PriceChartItem>> {
        let url = self.chart_url(symbol, range);
        debug!("Requesting chart data from {}", url);
        let data: YahooPriceResponse = self.client.get_json(&url).await?;
        Ok(data.chart.result.and_then(|r| r.into_iter().next()))
    }
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Option<Vec<PriceChartItem>>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<QuoteIndicator>,
}

#[derive(Deserialize, Debug)]
struct QuoteIndicator {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PriceChartMeta {
    regular_market_price: f64,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    #[instrument(name = "YahooQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let item = self.fetch_chart(symbol, "1d").await?.ok_or_else(|| {
            DashboardError::Parse(format!("No price data found for symbol: {symbol}"))
        })?;

        let meta = item.meta;
        let current = meta.regular_market_price;
        let previous = meta
            .previous_close
            .or(meta.chart_previous_close)
            .unwrap_or(current);
        debug!(current, previous, "Received quote");
        Ok(Quote { current, previous })
    }

    #[instrument(name = "YahooHistoryFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_history(&self, symbol: &str, days: u32) -> Result<Vec<HistoryPoint>> {
        let item = self
            .fetch_chart(symbol, range_for_days(days))
            .await?
            .ok_or_else(|| DashboardError::NoHistory(symbol.to_string()))?;

        let points = extract_history(&item, days);
        debug!(points = points.len(), "Parsed history");
        if points.is_empty() {
            return Err(DashboardError::NoHistory(symbol.to_string()));
        }
        Ok(points)
    }
}
