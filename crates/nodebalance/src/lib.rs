pub mod config;
pub mod format;
pub mod logger;
pub mod node;
pub mod rates;
pub mod report;
pub mod server;

pub use rates::{RateCacheEntry, RateResolver};
pub use report::{BalanceReporter, Defaults, ReportError};

use std::sync::Once;

static INIT: Once = Once::new();

/// .env 파일에서 환경변수를 읽는다. 라이브러리 로드 시 자동 호출된다.
fn init() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
    });
}

#[ctor::ctor]
fn setup() {
    init();
}
