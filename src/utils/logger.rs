use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 優先，否則依 verbose 決定本 crate 的等級
fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bipt_inclusion={},info", level)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

/// 給容器或排程環境使用，輸出 JSON 方便集中收集
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_target(false).json())
        .init();
}
