use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use interface::{
    BalanceMode, BalanceResponse, ChannelDetail, ChannelSnapshot, ListFunds, RateTable, MSATS,
};

use crate::format::{format_amount, format_balance, format_rates, unavailable_rates};
use crate::node::FundsSource;
use crate::rates::{is_known_fiat, RateResolver, DEFAULT_CURRENCIES};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid mode: {0}. Use: {1}")]
    InvalidMode(String, String),
    #[error("Failed to retrieve balance: {0}")]
    Balance(String),
}

/// 시작 시 한 번 읽는 기본값 (`nodebalance-mode`, `nodebalance-currencies`)
#[derive(Debug, Clone)]
pub struct Defaults {
    pub mode: String,
    pub currencies: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            mode: BalanceMode::Total.to_string(),
            currencies: String::new(),
        }
    }
}

/// "usd, EUR,,mxn" -> ["usd", "eur", "mxn"]
pub fn parse_currencies(currencies: &str) -> Vec<String> {
    currencies
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        // btc/sats/msats는 잔액에 항상 들어가므로 법정화폐 목록에서 뺀다
        .filter(|c| !RateTable::is_base_unit(c))
        .collect()
}

/// 온체인/채널 합계
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundsSummary {
    pub onchain_msat: u64,
    pub channel_msat: u64,
    pub channels: Vec<ChannelSnapshot>,
}

impl FundsSummary {
    pub fn from_funds(funds: &ListFunds) -> Self {
        let onchain_msat = funds
            .outputs
            .iter()
            .filter(|output| output.is_spendable())
            .map(|output| output.amount_msat)
            .sum();

        let channels: Vec<ChannelSnapshot> = funds
            .channels
            .iter()
            .filter_map(ChannelSnapshot::from_channel)
            .collect();
        let channel_msat = channels.iter().map(|ch| ch.outbound_msat).sum();

        Self {
            onchain_msat,
            channel_msat,
            channels,
        }
    }

    pub fn total_msat(&self) -> u64 {
        self.onchain_msat + self.channel_msat
    }
}

pub struct BalanceReporter {
    resolver: Arc<RateResolver>,
    funds: Arc<dyn FundsSource>,
    defaults: Defaults,
}

impl BalanceReporter {
    pub fn new(resolver: Arc<RateResolver>, funds: Arc<dyn FundsSource>, defaults: Defaults) -> Self {
        Self {
            resolver,
            funds,
            defaults,
        }
    }

    /// 모드 문자열과 통화 문자열을 해석한다.
    ///
    /// 알 수 없는 모드는 통화가 비어 있으면 통화 지정으로 본다
    /// (`nodebalance eur` == `nodebalance total eur`).
    pub fn parse_request(
        &self,
        mode: Option<&str>,
        currencies: Option<&str>,
    ) -> Result<(BalanceMode, Vec<String>), ReportError> {
        let mode_str = mode.unwrap_or(&self.defaults.mode).trim();
        let mut currencies_str = currencies.unwrap_or("");

        let mode = match mode_str.parse::<BalanceMode>() {
            Ok(mode) => mode,
            Err(_) if currencies_str.trim().is_empty() => {
                currencies_str = mode_str;
                BalanceMode::Total
            }
            Err(unknown) => {
                return Err(ReportError::InvalidMode(unknown, BalanceMode::valid_modes()));
            }
        };

        let mut codes = parse_currencies(currencies_str);
        if codes.is_empty() {
            codes = parse_currencies(&self.defaults.currencies);
        }
        if codes.is_empty() {
            codes = DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect();
        }

        Ok((mode, codes))
    }

    pub async fn report(
        &self,
        mode: Option<&str>,
        currencies: Option<&str>,
    ) -> Result<BalanceResponse, ReportError> {
        let (mode, codes) = self.parse_request(mode, currencies)?;
        info!("nodebalance mode={} currencies={}", mode, codes.join(","));

        if mode == BalanceMode::Rate {
            // 어느 프로바이더도 모르는 통화면 조회 자체를 건너뛴다
            if let Some(unknown) = codes.iter().find(|code| !is_known_fiat(code)) {
                warn!("Unknown fiat currency {}, skipping rate lookup", unknown);
                let cached = self.resolver.cached().await;
                return Ok(BalanceResponse::Rates(unavailable_rates(
                    &codes,
                    cached.fetched_at,
                )));
            }

            let entry = self.resolver.resolve(&codes).await;
            return Ok(BalanceResponse::Rates(format_rates(
                &entry.table,
                &codes,
                entry.fetched_at,
                self.resolver.timeout(),
                Utc::now(),
            )));
        }

        let entry = self.resolver.resolve(&codes).await;

        let funds = self.funds.list_funds().await.map_err(|e| {
            error!("Error in nodebalance: {}", e);
            ReportError::Balance(e.to_string())
        })?;
        let summary = FundsSummary::from_funds(&funds);
        info!(
            "On-chain balance: {} msat, channel balance: {} msat",
            summary.onchain_msat, summary.channel_msat
        );

        Ok(build_response(mode, &summary, &entry.table, &codes))
    }
}

fn build_response(
    mode: BalanceMode,
    summary: &FundsSummary,
    table: &RateTable,
    codes: &[String],
) -> BalanceResponse {
    match mode {
        BalanceMode::Onchain => {
            BalanceResponse::Onchain(format_balance(summary.onchain_msat, table, codes))
        }
        BalanceMode::Channels => {
            BalanceResponse::Channels(format_balance(summary.channel_msat, table, codes))
        }
        BalanceMode::ChannelDetails => BalanceResponse::ChannelDetails(
            summary
                .channels
                .iter()
                .map(|ch| ChannelDetail {
                    peer_id: ch.peer_id.clone(),
                    short_channel_id: ch.short_channel_id.clone(),
                    outbound_capacity: format_amount(ch.outbound_msat, MSATS, table),
                    inbound_capacity: format_amount(ch.inbound_msat, MSATS, table),
                    outbound_balance: format_balance(ch.outbound_msat, table, codes),
                    inbound_balance: format_balance(ch.inbound_msat, table, codes),
                })
                .collect(),
        ),
        BalanceMode::Total | BalanceMode::Rate => {
            BalanceResponse::Total(format_balance(summary.total_msat(), table, codes))
        }
    }
}
