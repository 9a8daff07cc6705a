//! 测试替身：供下游 crate 在不访问网络的情况下驱动 `PriceService` 与 HTTP 层。

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::market::entity::MarketObservation;
use crate::market::error::MarketError;
use crate::market::port::MarketDataProvider;

/// # Summary
/// 返回固定观测值的数据源，并记录被调用的次数与最近一次请求的时间范围。
#[derive(Default)]
pub struct StaticMarketData {
    observations: Vec<MarketObservation>,
    calls: AtomicUsize,
    last_range: Mutex<Option<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl StaticMarketData {
    pub fn new(observations: Vec<MarketObservation>) -> Self {
        Self {
            observations,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        *self
            .last_range
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn fetch_market_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketObservation>, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_range
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((start, end));
        Ok(self.observations.clone())
    }
}

/// 总是失败的数据源
pub struct FailingMarketData {
    error: MarketError,
}

impl FailingMarketData {
    pub fn new(error: MarketError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl MarketDataProvider for FailingMarketData {
    async fn fetch_market_data(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<MarketObservation>, MarketError> {
        Err(self.error.clone())
    }
}
