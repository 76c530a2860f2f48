use std::sync::Arc;

use color_eyre::eyre;
use structopt::StructOpt;
use tracing::info;

use nodebalance::config::{Command, Opt};
use nodebalance::node::{ClnRestClient, FundsSource};
use nodebalance::server::{self, AppState};
use nodebalance::{logger, BalanceReporter, RateResolver};

// lib.rs에서 자동으로 dotenv가 로드됨

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    let opt = Opt::from_args();

    // init logging
    let _guards = logger::init_tracing(opt.log_dir.as_deref())?;

    let providers = feeds::default_chain(opt.provider_timeout());
    let resolver = Arc::new(RateResolver::new(providers, opt.cache_timeout()));

    let funds: Arc<dyn FundsSource> = Arc::new(ClnRestClient::new(
        opt.clnrest_url.clone(),
        opt.rune.clone(),
        opt.accept_invalid_certs,
    )?);

    let reporter = Arc::new(BalanceReporter::new(resolver, funds, opt.defaults()));
    info!(
        "nodebalance 시작: 기본 모드 {}, 캐시 {}초",
        opt.mode, opt.cache_timeout
    );

    match opt.command {
        Command::Serve { port } => server::serve(AppState::new(reporter), port).await,
        Command::Query { mode, currencies } => {
            let response = reporter
                .report(mode.as_deref(), currencies.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
