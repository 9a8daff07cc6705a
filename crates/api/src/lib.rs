//! # `strompreis-api` - HTTP API 层
//!
//! 日前电价服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自浏览器前端的 HTTP 请求
//! - 调用下层 `PriceService` 获取三天电价网格
//! - 将领域模型转换为 JSON / CSV 返回给前端

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
