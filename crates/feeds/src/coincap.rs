use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{get_json, http_client, RateProvider, DEFAULT_TIMEOUT};
use interface::{FiatQuotes, ProviderError, ProviderId};

const BASE_URL: &str = "https://api.coincap.io";

#[derive(Clone)]
pub struct CoinCapClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinCapClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: http_client(timeout),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for CoinCapClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CoinCapResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinCapRate {
    id: String,
    #[serde(default)]
    symbol: Option<String>,
    rate_usd: UsdRate,
}

/// CoinCap은 rateUsd를 문자열로 주지만 숫자로 오는 경우도 받는다
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsdRate {
    Number(f64),
    Text(String),
}

impl UsdRate {
    fn value(&self) -> Option<f64> {
        match self {
            UsdRate::Number(v) => Some(*v),
            UsdRate::Text(s) => s.parse().ok(),
        }
    }
}

impl CoinCapRate {
    fn matches(&self, code: &str) -> bool {
        self.id.eq_ignore_ascii_case(code)
            || self
                .symbol
                .as_deref()
                .is_some_and(|symbol| symbol.eq_ignore_ascii_case(code))
    }
}

impl CoinCapClient {
    /// 1 BTC = ? USD
    async fn fetch_btc_usd(&self) -> Result<f64, ProviderError> {
        let url = format!("{}/v2/rates/bitcoin", self.base_url);
        let response: CoinCapResponse<CoinCapRate> = get_json(&self.http, &url, &[]).await?;

        match response.data.rate_usd.value() {
            Some(v) if v > 0.0 => Ok(v),
            _ => Err(ProviderError::Decode(format!(
                "invalid bitcoin rateUsd: {:?}",
                response.data.rate_usd
            ))),
        }
    }

    /// 각 자산/통화 1 단위 = ? USD
    async fn fetch_usd_rates(&self) -> Result<Vec<CoinCapRate>, ProviderError> {
        let url = format!("{}/v2/rates", self.base_url);
        let response: CoinCapResponse<Vec<CoinCapRate>> = get_json(&self.http, &url, &[]).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl RateProvider for CoinCapClient {
    fn id(&self) -> ProviderId {
        ProviderId::CoinCap
    }

    async fn fetch(&self, codes: &[String]) -> Result<FiatQuotes, ProviderError> {
        info!("Fetching rates from CoinCap for: {}", codes.join(","));

        let (btc_usd, usd_rates) =
            futures::future::try_join(self.fetch_btc_usd(), self.fetch_usd_rates()).await?;
        debug!("CoinCap BTC/USD: {}, {} rates", btc_usd, usd_rates.len());

        let mut quotes = FiatQuotes::new();
        for code in codes {
            let usd_per_unit = usd_rates
                .iter()
                .find(|rate| rate.matches(code))
                .and_then(|rate| rate.rate_usd.value());

            // fiat/BTC = (USD/BTC) / (USD/fiat)
            if let Some(usd_per_unit) = usd_per_unit.filter(|v| *v > 0.0) {
                quotes.insert(code.clone(), btc_usd / usd_per_unit);
            }
        }

        Ok(quotes)
    }
}
