use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use chrono::Local;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 이 구조체가 drop되기 전까지 로깅이 계속 작동합니다
pub struct TracingGuards {
    _file: Option<WorkerGuard>,
    _stderr: WorkerGuard,
}

/// Tracing 초기화.
/// stdout은 응답 JSON이 나가는 곳이라 콘솔 로그는 stderr로 보낸다.
/// `log_dir`이 있으면 날짜별 파일에도 INFO 이상을 기록한다.
pub fn init_tracing(log_dir: Option<&Path>) -> eyre::Result<TracingGuards> {
    let (stderr_writer, stderr_guard) = non_blocking(std::io::stderr());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let (file_writer, guard) = daily_file_appender(dir, "nodebalance")?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(stderr_writer).with_ansi(true))
        .try_init()?;

    Ok(TracingGuards {
        _file: file_guard,
        _stderr: stderr_guard,
    })
}

/// `logs/nodebalance.2025-11-29.log` 형식의 파일을 연다
fn daily_file_appender(base_dir: &Path, prefix: &str) -> eyre::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(base_dir)?;

    let date = Local::now().format("%Y-%m-%d").to_string();
    let path = base_dir.join(format!("{prefix}.{date}.log"));

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Ok(non_blocking(file))
}
