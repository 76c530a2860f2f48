use std::path::PathBuf;

use structopt::StructOpt;

use crate::report::Defaults;

/// 캐시 유지 시간 상한 (10년)
pub const MAX_CACHE_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn parse_cache_timeout(src: &str) -> Result<u64, String> {
    let secs: u64 = src.parse().map_err(|e| format!("{}", e))?;
    if secs > MAX_CACHE_TIMEOUT_SECS {
        return Err(format!(
            "cache timeout must be at most {} seconds",
            MAX_CACHE_TIMEOUT_SECS
        ));
    }
    Ok(secs)
}

#[derive(Debug, StructOpt)]
#[structopt(name = "nodebalance", about = "Lightning 노드 잔액을 BTC/sats/msats 및 법정화폐로 보여준다")]
pub struct Opt {
    /// 기본 출력 모드: total, onchain, channels, channel-details, rate
    #[structopt(long = "nodebalance-mode", env = "NODEBALANCE_MODE", default_value = "total")]
    pub mode: String,

    /// 기본 통화 (쉼표 구분, 예: usd,mxn,eur). 비어 있으면 usd,mxn
    #[structopt(long = "nodebalance-currencies", env = "NODEBALANCE_CURRENCIES")]
    pub currencies: Option<String>,

    /// 환율 캐시 유지 시간 (초)
    #[structopt(
        long,
        env = "NODEBALANCE_CACHE_TIMEOUT",
        default_value = "3600",
        parse(try_from_str = parse_cache_timeout)
    )]
    pub cache_timeout: u64,

    /// 프로바이더 요청 타임아웃 (초)
    #[structopt(long, env = "NODEBALANCE_PROVIDER_TIMEOUT", default_value = "5")]
    pub provider_timeout: u64,

    /// clnrest 주소
    #[structopt(long, env = "CLNREST_URL", default_value = "https://127.0.0.1:3010")]
    pub clnrest_url: String,

    /// clnrest 인증용 rune
    #[structopt(long, env = "CLNREST_RUNE")]
    pub rune: Option<String>,

    /// clnrest 자체 서명 인증서 허용
    #[structopt(long)]
    pub accept_invalid_certs: bool,

    /// 로그 파일 디렉터리. 없으면 stderr에만 기록
    #[structopt(long, env = "NODEBALANCE_LOG_DIR", parse(from_os_str))]
    pub log_dir: Option<PathBuf>,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// HTTP로 nodebalance 명령 제공
    Serve {
        #[structopt(long, env = "NODEBALANCE_PORT", default_value = "12090")]
        port: u16,
    },
    /// 한 번 조회하고 JSON 출력
    Query {
        /// 모드 또는 통화 (예: rate, eur)
        mode: Option<String>,
        /// 쉼표 구분 통화
        currencies: Option<String>,
    },
}

impl Opt {
    pub fn defaults(&self) -> Defaults {
        Defaults {
            mode: self.mode.clone(),
            currencies: self.currencies.clone().unwrap_or_default(),
        }
    }

    pub fn cache_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_timeout.min(MAX_CACHE_TIMEOUT_SECS) as i64)
    }

    pub fn provider_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.provider_timeout)
    }
}
