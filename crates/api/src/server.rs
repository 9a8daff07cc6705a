//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的装配逻辑持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use strompreis_core::config::ServerConfig;
use strompreis_market::service::PriceService;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::{health, prices};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `price_service` 在服务启动前注入，启动后只读，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 三天电价服务
    pub price_service: Arc<PriceService>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Austrian Electricity Prices API",
        version = "0.1.0",
        description = "基于 aWATTar 的奥地利日前电价 API，按维也纳民用日返回 23 / 24 / 25 小时的价格网格。",
        license(name = "MIT")
    ),
    tags(
        (name = "电价 (Prices)", description = "三天电价查询与 CSV 导出"),
        (name = "系统 (System)", description = "健康检查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树 (含 Swagger UI 与 CORS)，不绑定端口。
///
/// # Arguments
/// * `state` - 由装配逻辑注入的共享状态
/// * `config` - 服务配置，提供 CORS 白名单
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(prices::get_prices))
        .routes(routes!(prices::export_prices_csv))
        .routes(routes!(health::health_check))
        .with_state(state)
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors_layer(&config.cors_origins))
}

/// 只放行配置中的来源与 GET 方法
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// 构建路由并启动 HTTP 监听，直到 `shutdown` 完成。
///
/// # Arguments
/// * `state` - 由装配逻辑注入的共享状态
/// * `config` - 监听地址、端口与 CORS 配置
/// * `shutdown` - 优雅停机信号
pub async fn start_server(
    state: AppState,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state, config);
    let bind_addr = format!("{}:{}", config.host, config.port);

    tracing::info!("⚡ Strompreis API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}
