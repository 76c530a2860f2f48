use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use interface::{BalanceRecord, RateReport, RateTable, BTC, MSATS, SATS};

use crate::rates::{fiat_per_btc, is_plausible};

pub const RATE_INVALID: &str = "Rate invalid";
pub const RATE_UNAVAILABLE: &str = "Rate unavailable";

/// msat 금액을 단위별 표시 문자열로 바꾼다.
///
/// - `msats`, `sats`: 천 단위 구분 정수 (`1,234 sats`)
/// - `btc`: 소수점 8자리 (`0.00123400 btc`)
/// - 그 외 법정화폐: 천 단위 구분 + 소수점 2자리 + 대문자 코드 (`1,234.56 EUR`)
///
/// 환율이 0 이하이면 나누지 않고 `0.00 <UNIT>`을 돌려준다.
pub fn format_amount(amount_msat: u64, unit: &str, table: &RateTable) -> String {
    let rate = table.rate(unit);
    if rate <= 0.0 {
        return format!("0.00 {}", unit.to_uppercase());
    }

    let amount = amount_msat as f64 / rate;
    match unit {
        MSATS | SATS => format!("{} {}", group_thousands(amount, 0), unit),
        BTC => format!("{:.8} {}", amount, unit),
        _ => format!("{} {}", group_thousands(amount, 2), unit.to_uppercase()),
    }
}

/// `btc`, `sats`, `msats` 순서로 고정하고, 정상 환율이 있는 법정화폐만 뒤에 붙인다.
pub fn format_balance(amount_msat: u64, table: &RateTable, fiat_codes: &[String]) -> BalanceRecord {
    let mut balance = BalanceRecord::new();
    for unit in [BTC, SATS, MSATS] {
        balance.insert(unit, format_amount(amount_msat, unit, table));
    }

    for code in fiat_codes {
        if !is_plausible(table, code) {
            debug!("Skipping {}: no valid rate available", code);
            continue;
        }
        balance.insert(code.as_str(), format_amount(amount_msat, code, table));
    }

    balance
}

pub fn format_rates(
    table: &RateTable,
    fiat_codes: &[String],
    fetched_at: DateTime<Utc>,
    timeout: Duration,
    now: DateTime<Utc>,
) -> RateReport {
    let mut rates = BalanceRecord::new();
    for code in fiat_codes {
        let text = match fiat_per_btc(table, code) {
            Some(value) if is_plausible(table, code) => {
                format!("{} {}", group_thousands(value, 2), code.to_uppercase())
            }
            Some(value) => {
                debug!("Skipping {} rate: {:.2} fiat/BTC is invalid", code, value);
                RATE_INVALID.to_string()
            }
            None => RATE_UNAVAILABLE.to_string(),
        };
        rates.insert(code.as_str(), text);
    }

    RateReport {
        rates,
        timestamp: fetched_at.to_rfc3339(),
        cached: fetched_at
            .checked_add_signed(timeout)
            .map_or(true, |expires| expires > now),
    }
}

/// 조회 없이 모든 통화를 "Rate unavailable"로 채운 보고서
pub fn unavailable_rates(fiat_codes: &[String], fetched_at: DateTime<Utc>) -> RateReport {
    let mut rates = BalanceRecord::new();
    for code in fiat_codes {
        rates.insert(code.as_str(), RATE_UNAVAILABLE);
    }

    RateReport {
        rates,
        timestamp: fetched_at.to_rfc3339(),
        cached: false,
    }
}

/// 1234567.891 -> "1,234,567.89"
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}
