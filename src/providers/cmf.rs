//! Reference rates from the CMF Chile API (dollar and UF values in CLP).

use crate::core::error::{DashboardError, Result};
use crate::core::locale::parse_locale_number;
use crate::core::quote::{ReferenceRateProvider, ReferenceRates};
use crate::providers::relay::FallbackClient;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

pub struct CmfRateProvider {
    base_url: String,
    api_key: String,
    client: FallbackClient,
}

#[derive(Debug, Deserialize)]
struct CmfValue {
    #[serde(rename = "Valor")]
    value: String,
    #[serde(rename = "Fecha")]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DollarResponse {
    #[serde(rename = "Dolares", default)]
    values: Vec<CmfValue>,
}

#[derive(Debug, Deserialize)]
struct UfResponse {
    #[serde(rename = "UFs", default)]
    values: Vec<CmfValue>,
}

impl CmfRateProvider {
    pub fn new(base_url: &str, api_key: &str, client: FallbackClient) -> Self {
        CmfRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    fn resource_url(&self, resource: &str) -> String {
        format!(
            "{}/api-sbifv3/recursos_api/{}?apikey={}&formato=json",
            self.base_url, resource, self.api_key
        )
    }

    pub async fn fetch_dollar(&self) -> Result<f64> {
        let data: DollarResponse = self.client.get_json(&self.resource_url("dolar")).await?;
        first_value("dollar", data.values)
    }

    pub async fn fetch_uf(&self) -> Result<f64> {
        let data: UfResponse = self.client.get_json(&self.resource_url("uf")).await?;
        first_value("UF", data.values)
    }
}

fn first_value(resource: &str, values: Vec<CmfValue>) -> Result<f64> {
    let entry = values
        .into_iter()
        .next()
        .ok_or_else(|| DashboardError::Parse(format!("No {resource} data in CMF response")))?;
    let value = parse_locale_number(&entry.value)?;
    debug!(resource, value, date = ?entry.date, "Parsed CMF value");
    Ok(value)
}

#[async_trait]
impl ReferenceRateProvider for CmfRateProvider {
    #[instrument(name = "CmfRatesFetch", skip(self))]
    async fn fetch_rates(&self) -> Result<ReferenceRates> {
        let (usd, uf) = futures::try_join!(self.fetch_dollar(), self.fetch_uf())?;
        ReferenceRates::new(usd, uf)
    }
}
