//! # 电价路由
//!
//! 三天电价的 JSON 查询与 CSV 导出。

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use strompreis_market::prices::ThreeDayPrices;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, PricesQuery, PricesResponse};

/// CSV 表头
const CSV_HEADER: [&str; 6] = [
    "date",
    "hour",
    "price_eur_mwh",
    "price_ct_kwh",
    "is_missing",
    "is_dst_transition",
];

/// 查询三天电价
///
/// 返回所选日期及其前后各一天的小时电价。夏令时开始日 23 小时，
/// 夏令时结束日 25 小时 (重复的 02:00 标记为 `02:00A` / `02:00B`)。
#[utoipa::path(
    get,
    path = "/api/prices/{date}",
    tag = "电价 (Prices)",
    params(
        ("date" = String, Path, description = "日期，YYYY-MM-DD"),
        PricesQuery
    ),
    responses(
        (status = 200, description = "三天电价", body = PricesResponse),
        (status = 400, description = "日期格式或范围非法", body = ApiErrorResponse),
        (status = 502, description = "上游行情接口失败", body = ApiErrorResponse),
        (status = 500, description = "内部一致性错误", body = ApiErrorResponse)
    )
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<PricesResponse>, ApiError> {
    let selected = state.price_service.parse_date(&date)?;
    let prices = state
        .price_service
        .three_day_prices(selected, query.include_metadata)
        .await?;
    Ok(Json(PricesResponse::from(&prices)))
}

/// 导出三天电价 CSV
///
/// 行顺序为 前一天 → 所选日期 → 后一天，与 JSON 接口的数据完全一致。
#[utoipa::path(
    get,
    path = "/api/prices/{date}/export-csv",
    tag = "电价 (Prices)",
    params(
        ("date" = String, Path, description = "日期，YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "CSV 附件", content_type = "text/csv", body = String),
        (status = 400, description = "日期格式或范围非法", body = ApiErrorResponse),
        (status = 502, description = "上游行情接口失败", body = ApiErrorResponse),
        (status = 500, description = "内部一致性错误", body = ApiErrorResponse)
    )
)]
pub async fn export_prices_csv(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, ApiError> {
    let selected = state.price_service.parse_date(&date)?;
    let prices = state.price_service.three_day_prices(selected, false).await?;
    let body = render_csv(&prices)?;

    let disposition = format!(
        "attachment; filename=electricity_prices_{}_three_days.csv",
        selected.format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// # Summary
/// 将三天电价渲染为 CSV 文本。
///
/// # Invariants
/// - 缺失价格输出为空单元格，布尔值输出为 `True` / `False`。
pub fn render_csv(prices: &ThreeDayPrices) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for day in prices.days() {
        let date = day.date.format("%Y-%m-%d").to_string();
        for hour in day.hours() {
            let eur = optional_cell(hour.price_eur_per_mwh);
            let ct = optional_cell(hour.price_ct_per_kwh);
            writer
                .write_record([
                    date.as_str(),
                    hour.hour_label.as_str(),
                    eur.as_str(),
                    ct.as_str(),
                    bool_cell(hour.is_missing),
                    bool_cell(hour.is_dst_transition),
                ])
                .map_err(csv_error)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(e.to_string()))
}

/// 价格单元格：缺失为空，整数值保留 `.0` 后缀 (如 `45.0`)
fn optional_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{v:.1}"),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn bool_cell(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_cells_keep_decimal_point() {
        assert_eq!(optional_cell(Some(45.0)), "45.0");
        assert_eq!(optional_cell(Some(-3.0)), "-3.0");
        assert_eq!(optional_cell(Some(85.5)), "85.5");
        assert_eq!(optional_cell(Some(8.55)), "8.55");
        assert_eq!(optional_cell(None), "");
    }

    #[test]
    fn test_bool_cells_are_capitalised() {
        assert_eq!(bool_cell(true), "True");
        assert_eq!(bool_cell(false), "False");
    }
}
