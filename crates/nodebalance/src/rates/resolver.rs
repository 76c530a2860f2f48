use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use feeds::RateProvider;
use interface::{RateTable, BTC};

use super::{fallback_rate, RateCacheEntry};

/// 캐시 확인 -> 프로바이더 체인 -> 고정 환율 순서로 환율 테이블을 만든다.
///
/// 캐시는 리졸버가 소유하고, "신선도 확인 -> 조회 -> 교체" 전체를 하나의 락 안에서
/// 처리하므로 동시에 들어온 요청이 프로바이더를 중복 호출하지 않는다.
pub struct RateResolver {
    providers: Vec<Arc<dyn RateProvider>>,
    cache: Mutex<RateCacheEntry>,
    timeout: Duration,
}

impl RateResolver {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, timeout: Duration) -> Self {
        Self::with_cache(providers, timeout, RateCacheEntry::default())
    }

    pub fn with_cache(
        providers: Vec<Arc<dyn RateProvider>>,
        timeout: Duration,
        cache: RateCacheEntry,
    ) -> Self {
        Self {
            providers,
            cache: Mutex::new(cache),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 현재 캐시 내용 (조회 없이)
    pub async fn cached(&self) -> RateCacheEntry {
        self.cache.lock().await.clone()
    }

    pub async fn resolve(&self, codes: &[String]) -> RateCacheEntry {
        self.resolve_at(codes, Utc::now()).await
    }

    /// 실패하지 않는다. 최악의 경우 요청한 법정화폐 환율이 모두 0이 된다.
    pub async fn resolve_at(&self, codes: &[String], now: DateTime<Utc>) -> RateCacheEntry {
        let mut cache = self.cache.lock().await;

        if !cache.needs_refresh(codes, now, self.timeout) {
            info!("Using cached currency rates for: {}", codes.join(","));
            return cache.clone();
        }

        // 이번에 다시 받지 않는 통화의 기존 값은 유지
        let mut table = cache.table.clone();

        for provider in &self.providers {
            let quotes = match provider.fetch(codes).await {
                Ok(quotes) => quotes,
                Err(e) => {
                    warn!("{} API failed: {}", provider.id(), e);
                    continue;
                }
            };

            // 뒤 프로바이더의 값이 앞의 값을 덮어쓴다
            for code in codes {
                let Some(&fiat_per_btc) = quotes.get(code) else {
                    continue;
                };
                if fiat_per_btc <= 0.0 {
                    continue;
                }
                let rate = table.rate(BTC) / fiat_per_btc;
                table.set(code, rate);
                info!(
                    "Rate for {} from {}: {:.2} msat ({:.2} {}/BTC)",
                    code,
                    provider.id(),
                    rate,
                    fiat_per_btc,
                    code.to_uppercase()
                );
            }

            // 이 프로바이더 하나로 전부 채워졌을 때만 멈춘다
            if codes
                .iter()
                .all(|code| quotes.get(code).is_some_and(|v| *v > 0.0))
            {
                break;
            }
        }

        fill_missing(&mut table, codes);

        *cache = RateCacheEntry::new(table, now);
        cache.clone()
    }
}

/// 체인이 끝난 뒤에도 유효값이 없는 통화는 고정 환율, 그것도 없으면 0
fn fill_missing(table: &mut RateTable, codes: &[String]) {
    for code in codes {
        if table.rate(code) > 0.0 {
            continue;
        }
        match fallback_rate(code) {
            Some(rate) => {
                info!("Using fallback for {}: {} msat", code, rate);
                table.set(code, rate);
            }
            None => {
                warn!("No fallback available for {}", code);
                table.set(code, 0.0);
            }
        }
    }
}
