//! 展示标签与价格单位换算。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::zone::Disambiguation;

/// # Summary
/// 生成小时标签。
///
/// # Logic
/// 1. 普通小时返回 `HH:00`。
/// 2. 重复小时 (由调用方依据时区规则判定并传入消歧序号) 在回拨月份内追加 `A` / `B`。
///
/// # Arguments
/// * `wall_hour`: 墙钟小时 (0-23)。
/// * `disambiguation`: 仅重复小时传入 `Some`。
/// * `month`: 记录所在民用日期的月份。
/// * `fall_back_month`: 配置的回拨月份。
pub fn format_label(
    wall_hour: u32,
    disambiguation: Option<Disambiguation>,
    month: u32,
    fall_back_month: u32,
) -> String {
    let base = format!("{:02}:00", wall_hour % 24);
    match disambiguation {
        Some(Disambiguation::First) if month == fall_back_month => format!("{base}A"),
        Some(Disambiguation::Second) if month == fall_back_month => format!("{base}B"),
        _ => base,
    }
}

/// # Summary
/// EUR/MWh 换算为 ct/kWh，保留两位小数。
///
/// # Logic
/// 在十进制下按银行家舍入，避免 8.55 之类的值因二进制误差被舍错；
/// 无法表示为 `Decimal` 的极端值退回浮点舍入。
pub fn to_ct_per_kwh(price_eur_per_mwh: f64, conversion_factor: f64) -> f64 {
    let raw = price_eur_per_mwh / conversion_factor;
    Decimal::from_f64_retain(raw)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| (raw * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_labels() {
        assert_eq!(format_label(0, None, 1, 10), "00:00");
        assert_eq!(format_label(13, None, 6, 10), "13:00");
        // 回拨月份中的普通 02:00 不加后缀
        assert_eq!(format_label(2, None, 10, 10), "02:00");
    }

    #[test]
    fn test_ambiguous_labels_in_fall_back_month() {
        assert_eq!(
            format_label(2, Some(Disambiguation::First), 10, 10),
            "02:00A"
        );
        assert_eq!(
            format_label(2, Some(Disambiguation::Second), 10, 10),
            "02:00B"
        );
        assert_eq!(format_label(2, Some(Disambiguation::Second), 3, 10), "02:00");
    }

    #[test]
    fn test_ct_per_kwh_conversion() {
        assert_eq!(to_ct_per_kwh(85.5, 10.0), 8.55);
        assert_eq!(to_ct_per_kwh(45.0, 10.0), 4.5);
        assert_eq!(to_ct_per_kwh(-12.34, 10.0), -1.23);
        assert_eq!(to_ct_per_kwh(123.456, 10.0), 12.35);
        assert_eq!(to_ct_per_kwh(0.0, 10.0), 0.0);
    }
}
