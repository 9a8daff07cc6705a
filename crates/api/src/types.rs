//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use serde::{Deserialize, Serialize};
use strompreis_core::grid::entity::HourlyPriceRecord;
use strompreis_market::prices::{DayPrices, PriceMetadata, ThreeDayPrices};
use utoipa::{IntoParams, ToSchema};

// ============================================================
//  电价 DTO
// ============================================================

/// 单个小时电价 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourlyPriceResponse {
    /// 小时开始时刻 (毫秒级时间戳)
    #[schema(example = 1761433200000_i64)]
    pub timestamp_ms: i64,
    /// 墙钟标签，重复小时带 A / B 后缀
    #[schema(example = "02:00A")]
    pub hour_label: String,
    /// 电价 (EUR/MWh)，缺失时为 null
    #[schema(example = 85.5)]
    pub price_eur_mwh: Option<f64>,
    /// 电价 (ct/kWh)，缺失时为 null
    #[schema(example = 8.55)]
    pub price_ct_kwh: Option<f64>,
    pub is_missing: bool,
    /// 该小时之后 UTC 偏移发生变化
    pub is_dst_transition: bool,
}

impl From<&HourlyPriceRecord> for HourlyPriceResponse {
    fn from(record: &HourlyPriceRecord) -> Self {
        Self {
            timestamp_ms: record.instant_ms,
            hour_label: record.hour_label.clone(),
            price_eur_mwh: record.price_eur_per_mwh,
            price_ct_kwh: record.price_ct_per_kwh,
            is_missing: record.is_missing,
            is_dst_transition: record.is_dst_transition,
        }
    }
}

/// 单日电价 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DayPricesResponse {
    /// 民用日期
    #[schema(example = "2025-10-26")]
    pub date: String,
    pub hours: Vec<HourlyPriceResponse>,
    /// 当天小时数 (23 / 24 / 25)
    #[schema(example = 25)]
    pub total_hours: usize,
    pub missing_hours: usize,
}

impl From<&DayPrices> for DayPricesResponse {
    fn from(day: &DayPrices) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            hours: day.hours().iter().map(HourlyPriceResponse::from).collect(),
            total_hours: day.total_hours(),
            missing_hours: day.missing_hours(),
        }
    }
}

/// 三天各自的小时数
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourCountsResponse {
    pub previous: usize,
    pub selected: usize,
    pub next: usize,
}

/// 处理元数据 DTO，未请求时序列化为空对象 `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PriceMetadataResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Europe/Vienna")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_factor: Option<f64>,
    /// 上游返回的原始数据点数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points_received: Option<usize>,
    /// 处理时间 (配置时区，RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_counts: Option<HourCountsResponse>,
}

impl From<&PriceMetadata> for PriceMetadataResponse {
    fn from(metadata: &PriceMetadata) -> Self {
        Self {
            timezone: Some(metadata.timezone.clone()),
            conversion_factor: Some(metadata.conversion_factor),
            data_points_received: Some(metadata.data_points_received),
            processing_timestamp: Some(metadata.processing_timestamp.to_rfc3339()),
            hour_counts: Some(HourCountsResponse {
                previous: metadata.hour_counts.previous_day,
                selected: metadata.hour_counts.selected_day,
                next: metadata.hour_counts.next_day,
            }),
        }
    }
}

/// 三天电价响应 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricesResponse {
    pub previous_day: DayPricesResponse,
    pub selected_day: DayPricesResponse,
    pub next_day: DayPricesResponse,
    pub metadata: PriceMetadataResponse,
}

impl From<&ThreeDayPrices> for PricesResponse {
    fn from(prices: &ThreeDayPrices) -> Self {
        Self {
            previous_day: DayPricesResponse::from(&prices.previous_day),
            selected_day: DayPricesResponse::from(&prices.selected_day),
            next_day: DayPricesResponse::from(&prices.next_day),
            metadata: prices
                .metadata
                .as_ref()
                .map(PriceMetadataResponse::from)
                .unwrap_or_default(),
        }
    }
}

/// 电价查询参数
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PricesQuery {
    /// 是否附加处理元数据
    #[serde(default)]
    pub include_metadata: bool,
}

// ============================================================
//  系统 DTO
// ============================================================

/// 健康检查 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "Electricity Prices API")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "/swagger-ui")]
    pub docs: String,
    #[schema(example = "Europe/Vienna")]
    pub timezone: String,
    /// 当前时间 (配置时区，RFC 3339)
    pub timestamp: String,
}

// ============================================================
//  通用响应
// ============================================================

/// 失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_metadata_serializes_as_empty_object() {
        let json = serde_json::to_value(PriceMetadataResponse::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
