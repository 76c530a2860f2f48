pub mod cache;
pub mod resolver;

use interface::{RateTable, BTC};

pub use cache::RateCacheEntry;
pub use resolver::RateResolver;

/// 요청에 통화가 없을 때 쓰는 기본 통화
pub const DEFAULT_CURRENCIES: [&str; 2] = ["usd", "mxn"];

/// 모든 프로바이더가 실패했을 때 쓰는 고정 환율 (msat / 통화 1 단위).
/// 이 값들은 정상 범위 밖이라 환율 조회에서는 "Rate invalid"로 보인다.
pub const FALLBACK_RATES: [(&str, f64); 2] = [("mxn", 0.00005), ("usd", 0.000001)];

/// 1 BTC 당 법정화폐 값의 정상 범위. 양 끝값은 허용한다.
pub const MIN_FIAT_PER_BTC: f64 = 1e3;
pub const MAX_FIAT_PER_BTC: f64 = 1e10;

/// rate 모드에서 조회를 허용하는 법정화폐 (CoinGecko vs_currencies 기준)
pub const KNOWN_FIAT_CURRENCIES: [&str; 46] = [
    "aed", "ars", "aud", "bdt", "bhd", "bmd", "brl", "cad", "chf", "clp", "cny", "czk", "dkk",
    "eur", "gbp", "gel", "hkd", "huf", "idr", "ils", "inr", "jpy", "krw", "kwd", "lkr", "mmk",
    "mxn", "myr", "ngn", "nok", "nzd", "php", "pkr", "pln", "rub", "sar", "sek", "sgd", "thb",
    "try", "twd", "uah", "usd", "vef", "vnd", "zar",
];

pub fn is_known_fiat(code: &str) -> bool {
    KNOWN_FIAT_CURRENCIES.contains(&code)
}

pub fn fallback_rate(code: &str) -> Option<f64> {
    FALLBACK_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, rate)| *rate)
}

/// 시작 시 캐시에 들어가는 테이블: 기준 단위 + 고정 환율
pub fn default_table() -> RateTable {
    let mut table = RateTable::new();
    for (code, rate) in FALLBACK_RATES {
        table.set(code, rate);
    }
    table
}

/// 1 BTC = ? 법정화폐. 환율이 0 이하이면 None.
pub fn fiat_per_btc(table: &RateTable, code: &str) -> Option<f64> {
    let rate = table.rate(code);
    if rate > 0.0 {
        Some(table.rate(BTC) / rate)
    } else {
        None
    }
}

pub fn is_plausible(table: &RateTable, code: &str) -> bool {
    fiat_per_btc(table, code)
        .is_some_and(|value| (MIN_FIAT_PER_BTC..=MAX_FIAT_PER_BTC).contains(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use interface::MSAT_PER_BTC;

    fn table_with(code: &str, fiat_per_btc: f64) -> RateTable {
        let mut table = RateTable::new();
        table.set(code, MSAT_PER_BTC / fiat_per_btc);
        table
    }

    #[test]
    fn test_sanity_band_edges_are_accepted() {
        assert!(is_plausible(&table_with("eur", 1e3), "eur"));
        assert!(is_plausible(&table_with("eur", 1e10), "eur"));
        assert!(is_plausible(&table_with("eur", 91_604.0), "eur"));
    }

    #[test]
    fn test_outside_sanity_band() {
        assert!(!is_plausible(&table_with("eur", 999.99), "eur"));
        assert!(!is_plausible(&table_with("eur", 1.0000001e10), "eur"));
    }

    #[test]
    fn test_zero_or_missing_rate_is_implausible() {
        let mut table = RateTable::new();
        assert!(!is_plausible(&table, "gbp"));

        table.set("gbp", 0.0);
        assert!(!is_plausible(&table, "gbp"));
        assert_eq!(fiat_per_btc(&table, "gbp"), None);
    }

    #[test]
    fn test_fallback_rates_are_outside_band() {
        let table = default_table();
        assert_eq!(table.rate("usd"), 0.000001);
        assert_eq!(table.rate("mxn"), 0.00005);
        assert!(!is_plausible(&table, "usd"));
        assert!(!is_plausible(&table, "mxn"));
        assert_eq!(fallback_rate("gbp"), None);
    }

    #[test]
    fn test_known_fiat() {
        assert!(is_known_fiat("eur"));
        assert!(is_known_fiat("usd"));
        assert!(!is_known_fiat("xyz"));
        assert!(!is_known_fiat("btc"));
    }
}
