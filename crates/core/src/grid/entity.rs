use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 网格中的单个小时记录。
///
/// # Invariants
/// - `is_missing == price_eur_per_mwh.is_none()`。
/// - `price_ct_per_kwh` 与 `price_eur_per_mwh` 同时存在或同时缺失。
/// - `hour_label` 形如 `HH:MM`，仅重复小时的两次出现带 `A` / `B` 后缀。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPriceRecord {
    // 小时开始时刻 (UTC 毫秒)
    pub instant_ms: i64,
    // 展示用墙钟标签
    pub hour_label: String,
    pub price_eur_per_mwh: Option<f64>,
    pub price_ct_per_kwh: Option<f64>,
    pub is_missing: bool,
    // 该小时与下一小时的 UTC 偏移不同
    pub is_dst_transition: bool,
}

impl HourlyPriceRecord {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.instant_ms)
    }
}

/// # Summary
/// 单个民用日的小时网格。
///
/// # Invariants
/// - 记录按 `instant_ms` 严格递增，不存在重复时刻。
/// - 普通日 24 条，夏令时开始日 23 条，夏令时结束日 25 条。
/// - 只能由网格构建器创建，创建后不可变。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGrid {
    date: NaiveDate,
    records: Vec<HourlyPriceRecord>,
    has_dst_transition: bool,
}

impl DayGrid {
    pub(crate) fn new(
        date: NaiveDate,
        records: Vec<HourlyPriceRecord>,
        has_dst_transition: bool,
    ) -> Self {
        Self {
            date,
            records,
            has_dst_transition,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn records(&self) -> &[HourlyPriceRecord] {
        &self.records
    }

    /// 遍历过程中是否遇到夏令时切换 (空洞或偏移变化)
    pub fn has_dst_transition(&self) -> bool {
        self.has_dst_transition
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn missing_hours(&self) -> usize {
        self.records.iter().filter(|r| r.is_missing).count()
    }

    pub fn into_records(self) -> Vec<HourlyPriceRecord> {
        self.records
    }
}
