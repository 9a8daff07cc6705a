use strompreis_core::grid::error::GridError;
use strompreis_core::market::error::MarketError;
use thiserror::Error;

/// # Summary
/// 电价服务错误枚举。
///
/// # Invariants
/// - 三类失败严格区分：调用方输入错误、上游 (外部) 失败、内部一致性失败，
///   以便上层分别采用不同的重试与上报策略。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// 日期格式或范围非法
    #[error("Invalid date format or range: {0}")]
    InvalidDate(String),
    /// 上游行情接口失败
    #[error("API fetch failed: {0}")]
    Upstream(#[from] MarketError),
    /// 网格长度与独立校验结果不一致
    #[error("Internal consistency error: {0}")]
    Inconsistent(#[from] GridError),
}
