use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{get_json, http_client, RateProvider, DEFAULT_TIMEOUT};
use interface::{FiatQuotes, ProviderError, ProviderId};

const BASE_URL: &str = "https://api.coingecko.com";

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
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

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: HashMap<String, f64>,
}

#[async_trait]
impl RateProvider for CoinGeckoClient {
    fn id(&self) -> ProviderId {
        ProviderId::CoinGecko
    }

    async fn fetch(&self, codes: &[String]) -> Result<FiatQuotes, ProviderError> {
        let currency_param = codes.join(",");
        info!("Fetching rates from CoinGecko for: {}", currency_param);

        // 필요한 통화만 정확히 요청한다
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let response: SimplePriceResponse = get_json(
            &self.http,
            &url,
            &[("ids", "bitcoin"), ("vs_currencies", currency_param.as_str())],
        )
        .await?;
        debug!("CoinGecko response: {:?}", response.bitcoin);

        let quotes = codes
            .iter()
            .filter_map(|code| {
                response
                    .bitcoin
                    .get(code)
                    .map(|price| (code.clone(), *price))
            })
            .collect();

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_coingecko_client_id() {
        let client = CoinGeckoClient::new();
        assert_eq!(client.id(), ProviderId::CoinGecko);
    }

    #[tokio::test]
    async fn test_fetch_requested_currencies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "gbp,eur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": {"gbp": 78000, "eur": 91604.5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new().with_base_url(server.uri());
        let quotes = client.fetch(&codes(&["gbp", "eur"])).await.unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["gbp"], 78000.0);
        assert_eq!(quotes["eur"], 91604.5);
    }

    #[tokio::test]
    async fn test_missing_currency_is_left_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": {"usd": 100000}
            })))
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new().with_base_url(server.uri());
        let quotes = client.fetch(&codes(&["usd", "xyz"])).await.unwrap();

        assert_eq!(quotes.get("usd"), Some(&100000.0));
        assert!(!quotes.contains_key("xyz"));
    }

    #[tokio::test]
    async fn test_currency_codes_are_query_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "usd,a&b#c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": {"usd": 100000}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new().with_base_url(server.uri());
        let quotes = client.fetch(&codes(&["usd", "a&b#c"])).await.unwrap();

        assert_eq!(quotes.get("usd"), Some(&100000.0));
        assert_eq!(quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_http_error_is_total_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new().with_base_url(server.uri());
        let result = client.fetch(&codes(&["usd"])).await;

        match result {
            Err(ProviderError::Other(msg)) => assert!(msg.contains("429")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_total_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})),
            )
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new().with_base_url(server.uri());
        let result = client.fetch(&codes(&["usd"])).await;

        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }
}
