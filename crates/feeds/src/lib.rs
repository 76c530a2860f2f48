use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use interface::{FiatQuotes, ProviderError, ProviderId};

pub mod coincap;
pub mod coingecko;
pub mod coinpaprika;

/// 프로바이더 한 번 호출에 허용하는 시간
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// BTC 시세 제공자의 공통 인터페이스.
///
/// `codes`는 소문자 통화 코드이며, 결과는 요청한 코드 중 응답에 있던 것만
/// 1 BTC 당 법정화폐 단위로 담는다. HTTP 상태 오류나 응답 형식 불일치는
/// 부분 결과 없이 전체 실패로 처리한다.
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn fetch(&self, codes: &[String]) -> Result<FiatQuotes, ProviderError>;
}

/// 우선순위 순서: CoinGecko -> CoinPaprika -> CoinCap
pub fn default_chain(timeout: Duration) -> Vec<Arc<dyn RateProvider>> {
    vec![
        Arc::new(CoinGeckoClient::with_timeout(timeout)),
        Arc::new(CoinPaprikaClient::with_timeout(timeout)),
        Arc::new(CoinCapClient::with_timeout(timeout)),
    ]
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// GET 후 상태 코드를 확인하고 JSON으로 파싱한다.
/// 쿼리 값은 reqwest가 인코딩한다.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let response = http.get(url).query(query).send().await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Other(format!(
            "HTTP error: status {}, response: {}",
            status,
            body.chars().take(200).collect::<String>()
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::Decode(format!(
            "{}, response: {}",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })
}

pub use coincap::CoinCapClient;
pub use coingecko::CoinGeckoClient;
pub use coinpaprika::CoinPaprikaClient;
