use std::collections::HashMap;

pub const MSATS: &str = "msats";
pub const SATS: &str = "sats";
pub const BTC: &str = "btc";

pub const MSAT_PER_SAT: f64 = 1_000.0;
pub const MSAT_PER_BTC: f64 = 100_000_000_000.0;

/// 프로바이더 응답을 정규화한 값: 통화 코드(소문자) -> 1 BTC 당 법정화폐 단위
pub type FiatQuotes = HashMap<String, f64>;

/// 통화 코드 -> 해당 통화 1 단위 당 msat.
///
/// `msats`, `sats`, `btc` 세 기준 단위는 생성 시 고정되며 `set`으로 바꿀 수 없다.
/// 법정화폐 항목의 `0`은 "유효한 환율 없음"을 뜻한다.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(MSATS.to_string(), 1.0);
        rates.insert(SATS.to_string(), MSAT_PER_SAT);
        rates.insert(BTC.to_string(), MSAT_PER_BTC);
        Self { rates }
    }
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_base_unit(code: &str) -> bool {
        matches!(code, MSATS | SATS | BTC)
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// 없는 코드는 0으로 취급
    pub fn rate(&self, code: &str) -> f64 {
        self.get(code).unwrap_or(0.0)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// 법정화폐 항목만 갱신한다. 기준 단위는 무시하고 false를 돌려준다.
    pub fn set(&mut self, code: &str, msat_per_unit: f64) -> bool {
        if Self::is_base_unit(code) {
            return false;
        }
        self.rates.insert(code.to_string(), msat_per_unit);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_units_are_fixed() {
        let mut table = RateTable::new();
        assert_eq!(table.rate(MSATS), 1.0);
        assert_eq!(table.rate(SATS), 1_000.0);
        assert_eq!(table.rate(BTC), 100_000_000_000.0);

        assert!(!table.set(BTC, 1.0));
        assert!(!table.set(SATS, 0.0));
        assert_eq!(table.rate(BTC), MSAT_PER_BTC);
        assert_eq!(table.rate(SATS), MSAT_PER_SAT);
    }

    #[test]
    fn test_missing_code_reads_as_zero() {
        let mut table = RateTable::new();
        assert!(!table.contains("eur"));
        assert_eq!(table.rate("eur"), 0.0);

        assert!(table.set("eur", 1_091_703.0));
        assert_eq!(table.get("eur"), Some(1_091_703.0));
    }
}
