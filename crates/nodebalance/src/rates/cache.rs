use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use interface::RateTable;

use super::{default_table, fiat_per_btc, is_plausible};

/// 마지막으로 확보한 환율 테이블과 조회 시각.
/// 갱신은 항상 통째로 교체한다.
#[derive(Debug, Clone)]
pub struct RateCacheEntry {
    pub table: RateTable,
    pub fetched_at: DateTime<Utc>,
}

impl Default for RateCacheEntry {
    /// 고정 환율 + epoch 시각이라 처음에는 항상 만료 상태
    fn default() -> Self {
        Self {
            table: default_table(),
            fetched_at: DateTime::<Utc>::default(),
        }
    }
}

impl RateCacheEntry {
    pub fn new(table: RateTable, fetched_at: DateTime<Utc>) -> Self {
        Self { table, fetched_at }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        // 더할 수 없을 만큼 긴 유지 시간은 만료되지 않는 것으로 본다
        self.fetched_at
            .checked_add_signed(timeout)
            .map_or(true, |expires| expires > now)
    }

    /// 만료되었거나, 요청 통화가 없거나, 비정상 환율이 하나라도 있으면 true
    pub fn needs_refresh(&self, codes: &[String], now: DateTime<Utc>, timeout: Duration) -> bool {
        let mut valid = true;
        for code in codes {
            if !self.table.contains(code) {
                debug!("Missing cached rate for {}", code);
                valid = false;
            } else if !is_plausible(&self.table, code) {
                match fiat_per_btc(&self.table, code) {
                    Some(value) => debug!("Invalid cached rate for {}: {:.2} fiat/BTC", code, value),
                    None => debug!("Zero cached rate for {}", code),
                }
                valid = false;
            }
        }

        !valid || !self.is_fresh(now, timeout)
    }
}
