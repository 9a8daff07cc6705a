mod settings;

use std::sync::Arc;

use strompreis_api::server::{AppState, start_server};
use strompreis_core::common::time::RealTimeProvider;
use strompreis_core::config::LogConfig;
use strompreis_core::grid::GridContext;
use strompreis_feed::awattar::AwattarProvider;
use strompreis_market::service::PriceService;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// 滚动日志文件名前缀
const LOG_FILE_PREFIX: &str = "strompreis.log";

/// # Summary
/// 应用启动入口，纯粹的装配逻辑。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 PriceService。
///
/// # Logic
/// 1. 加载配置并初始化全局日志。
/// 2. 校验时区与换算系数，构建网格上下文 (失败即终止启动)。
/// 3. 实例化基础设施层 (aWATTar 数据源)。
/// 4. 构造应用服务层 (PriceService)。
/// 5. 启动 HTTP 服务，收到 Ctrl-C 后优雅退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config = settings::load()?;
    let _log_guard = init_tracing(&config.log);
    info!("Strompreis starting...");

    // 2. 网格上下文
    let grid = GridContext::from_config(&config.market)?;
    info!(
        timezone = grid.clock().name(),
        conversion_factor = grid.conversion_factor(),
        "Grid context ready"
    );

    // 3. 基础设施层
    let feed = Arc::new(AwattarProvider::new(&config.feed)?);

    // 4. 应用服务层
    let price_service = Arc::new(PriceService::new(
        feed,
        grid,
        Arc::new(RealTimeProvider),
        config.market.max_date_offset_days,
    ));

    // 5. HTTP 服务
    start_server(AppState { price_service }, &config.server, shutdown_signal()).await?;

    info!("Shutdown complete. Exiting...");
    Ok(())
}

/// # Summary
/// 安装全局 tracing 订阅者。
///
/// # Returns
/// 配置了日志目录时返回文件写入器的守卫，守卫析构前日志会被刷盘。
fn init_tracing(config: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
