use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod funds;
pub mod rates;
pub mod report;

pub use funds::{ChannelSnapshot, ChannelState, FundChannel, FundOutput, ListFunds, OutputStatus};
pub use rates::{FiatQuotes, RateTable, BTC, MSATS, MSAT_PER_BTC, MSAT_PER_SAT, SATS};
pub use report::{BalanceMode, BalanceRecord, BalanceResponse, ChannelDetail, RateReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    CoinGecko,
    CoinPaprika,
    CoinCap,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderId::CoinGecko => "CoinGecko",
            ProviderId::CoinPaprika => "CoinPaprika",
            ProviderId::CoinCap => "CoinCap",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("other error: {0}")]
    Other(String),
}
