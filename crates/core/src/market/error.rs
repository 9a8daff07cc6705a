use thiserror::Error;

/// # Summary
/// 行情数据域错误枚举，覆盖上游接口的网络、状态码与解析失败。
///
/// # Invariants
/// - 全部属于外部原因导致的失败，调用方可以选择重试；与内部一致性错误严格区分。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 上游返回了非 2xx 状态码
    #[error("Upstream returned HTTP {0}")]
    Status(u16),
    // 请求超时
    #[error("Request timed out")]
    Timeout,
    // 数据解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
}
