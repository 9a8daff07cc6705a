use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::market::entity::MarketObservation;
use crate::market::error::MarketError;

/// # Summary
/// 日前电价数据提供者接口 (原始数据源)。
///
/// # Invariants
/// - 实现者只负责获取数据，不负责按民用日对齐或补全缺失小时。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取 `[start, end)` 时间范围内的小时电价。
    ///
    /// # Logic
    /// 1. 构建数据源请求。
    /// 2. 执行网络请求并解析响应数据。
    ///
    /// # Arguments
    /// * `start`: 开始时间 (含)。
    /// * `end`: 结束时间 (不含)。
    ///
    /// # Returns
    /// 成功返回观测值列表 (可能为空、可能不连续)，失败返回 MarketError。
    async fn fetch_market_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketObservation>, MarketError>;
}
