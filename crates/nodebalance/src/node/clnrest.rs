use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{FundsSource, NodeError};
use interface::ListFunds;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Core Lightning `clnrest` 플러그인을 통한 `listfunds` 호출
#[derive(Clone)]
pub struct ClnRestClient {
    http: reqwest::Client,
    base_url: String,
    rune: Option<String>,
}

impl ClnRestClient {
    /// clnrest는 보통 자체 서명 인증서를 쓰므로 `accept_invalid_certs`로 검증을 끌 수 있다.
    pub fn new(
        base_url: impl Into<String>,
        rune: Option<String>,
        accept_invalid_certs: bool,
    ) -> Result<Self, NodeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rune,
        })
    }
}

#[async_trait]
impl FundsSource for ClnRestClient {
    async fn list_funds(&self) -> Result<ListFunds, NodeError> {
        let url = format!("{}/v1/listfunds", self.base_url);

        let mut request = self.http.post(&url).json(&serde_json::json!({}));
        if let Some(rune) = &self.rune {
            request = request.header("Rune", rune.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(NodeError::Rpc(format!(
                "listfunds HTTP error: status {}, response: {}",
                status,
                response_text.chars().take(200).collect::<String>()
            )));
        }

        debug!("listfunds output: {}", response_text);

        serde_json::from_str(&response_text).map_err(|e| {
            NodeError::Rpc(format!(
                "Failed to parse listfunds response: {}, response: {}",
                e,
                response_text.chars().take(200).collect::<String>()
            ))
        })
    }
}
