use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 上游行情接口返回的一条小时电价观测值。
///
/// # Invariants
/// - `instant_ms` 为该小时开始时刻的 UTC 毫秒时间戳。
/// - 观测值之间不保证连续、完整或有序。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    // 小时开始时刻 (UTC 毫秒)
    pub instant_ms: i64,
    // 日前市场价格 (EUR/MWh)
    pub price_eur_per_mwh: f64,
}

impl MarketObservation {
    pub fn new(instant: DateTime<Utc>, price_eur_per_mwh: f64) -> Self {
        Self {
            instant_ms: instant.timestamp_millis(),
            price_eur_per_mwh,
        }
    }
}

/// # Summary
/// 按时刻索引的观测值集合。
///
/// # Invariants
/// - 同一时刻出现多次时，以最后一次出现的价格为准 (last-seen-wins)。
/// - 内部按时刻有序，遍历结果对相同输入总是确定的。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    prices: BTreeMap<i64, f64>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一条观测值，已存在的时刻会被覆盖
    pub fn insert(&mut self, observation: MarketObservation) {
        self.prices
            .insert(observation.instant_ms, observation.price_eur_per_mwh);
    }

    /// 查询某一时刻的价格
    pub fn price_at(&self, instant: DateTime<Utc>) -> Option<f64> {
        self.prices.get(&instant.timestamp_millis()).copied()
    }

    /// # Summary
    /// 截取落在 `[start, end)` 内的观测值，用于按民用日拆分三天的数据。
    pub fn within(&self, range: Range<DateTime<Utc>>) -> ObservationSet {
        let bounds = range.start.timestamp_millis()..range.end.timestamp_millis();
        Self {
            prices: self
                .prices
                .range(bounds)
                .map(|(instant, price)| (*instant, *price))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// 按时刻升序遍历
    pub fn iter(&self) -> impl Iterator<Item = MarketObservation> + '_ {
        self.prices
            .iter()
            .map(|(instant_ms, price)| MarketObservation {
                instant_ms: *instant_ms,
                price_eur_per_mwh: *price,
            })
    }
}

impl FromIterator<MarketObservation> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = MarketObservation>>(iter: I) -> Self {
        let mut set = Self::new();
        for observation in iter {
            set.insert(observation);
        }
        set
    }
}
