use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use strompreis_core::grid::entity::{DayGrid, HourlyPriceRecord};

/// # Summary
/// 单个民用日的完整电价网格。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPrices {
    pub date: NaiveDate,
    pub grid: DayGrid,
}

impl DayPrices {
    pub fn new(grid: DayGrid) -> Self {
        Self {
            date: grid.date(),
            grid,
        }
    }

    pub fn hours(&self) -> &[HourlyPriceRecord] {
        self.grid.records()
    }

    pub fn total_hours(&self) -> usize {
        self.grid.len()
    }

    pub fn missing_hours(&self) -> usize {
        self.grid.missing_hours()
    }
}

/// 三天各自的小时数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCounts {
    pub previous_day: usize,
    pub selected_day: usize,
    pub next_day: usize,
}

/// # Summary
/// 可选的处理元数据。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMetadata {
    pub timezone: String,
    pub conversion_factor: f64,
    /// 上游返回的原始数据点数 (去重前)
    pub data_points_received: usize,
    /// 处理时间，带配置时区当时的偏移
    pub processing_timestamp: DateTime<FixedOffset>,
    pub hour_counts: HourCounts,
}

/// # Summary
/// 三天电价查询结果。
///
/// # Invariants
/// - 三个网格依次为所选日期的前一天、当天、后一天。
/// - 每个网格的长度均已通过独立校验。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreeDayPrices {
    pub previous_day: DayPrices,
    pub selected_day: DayPrices,
    pub next_day: DayPrices,
    pub metadata: Option<PriceMetadata>,
}

impl ThreeDayPrices {
    /// 按时间顺序返回三天
    pub fn days(&self) -> [&DayPrices; 3] {
        [&self.previous_day, &self.selected_day, &self.next_day]
    }

    pub fn hour_counts(&self) -> HourCounts {
        HourCounts {
            previous_day: self.previous_day.total_hours(),
            selected_day: self.selected_day.total_hours(),
            next_day: self.next_day.total_hours(),
        }
    }
}
