use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{get_json, http_client, RateProvider, DEFAULT_TIMEOUT};
use interface::{FiatQuotes, ProviderError, ProviderId};

const BASE_URL: &str = "https://api.coinpaprika.com";

/// CoinPaprika는 요청 통화를 고르지 않고 고정된 묶음을 받아서 걸러낸다
const QUOTE_BUNDLE: &str = "USD,EUR,GBP,JPY,CAD,AUD,CHF,CNY,MXN,BRL,KRW,INR";

#[derive(Clone)]
pub struct CoinPaprikaClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinPaprikaClient {
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

impl Default for CoinPaprikaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    quotes: HashMap<String, PaprikaQuote>,
}

#[derive(Debug, Deserialize)]
struct PaprikaQuote {
    price: f64,
}

#[async_trait]
impl RateProvider for CoinPaprikaClient {
    fn id(&self) -> ProviderId {
        ProviderId::CoinPaprika
    }

    async fn fetch(&self, codes: &[String]) -> Result<FiatQuotes, ProviderError> {
        info!("Fetching rates from CoinPaprika for: {}", codes.join(","));

        let url = format!("{}/v1/tickers/btc-bitcoin", self.base_url);
        let response: TickerResponse =
            get_json(&self.http, &url, &[("quotes", QUOTE_BUNDLE)]).await?;
        debug!("CoinPaprika quotes: {:?}", response.quotes);

        let mut quotes = FiatQuotes::new();
        for code in codes {
            // 응답 키는 "USD" 같은 대문자
            let quote = response
                .quotes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(code));
            if let Some((_, quote)) = quote {
                quotes.insert(code.clone(), quote.price);
            }
        }

        Ok(quotes)
    }
}
