pub mod clnrest;

use async_trait::async_trait;
use thiserror::Error;

use interface::ListFunds;

pub use clnrest::ClnRestClient;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error: {0}")]
    Rpc(String),
}

/// 노드의 자금 상태를 읽기 전용으로 조회한다.
#[async_trait]
pub trait FundsSource: Send + Sync {
    async fn list_funds(&self) -> Result<ListFunds, NodeError>;
}
