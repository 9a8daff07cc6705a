use chrono::{DateTime, Duration, NaiveDate, Utc};
use strompreis_core::zone::CivilClock;

use crate::error::ServiceError;

/// # Summary
/// 以所选日期为中心的三天查询窗口。
///
/// # Invariants
/// - `start` 为前一天的本地零点，`end` 为后一天之后那天的本地零点。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub previous: NaiveDate,
    pub selected: NaiveDate,
    pub next: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// # Summary
    /// 计算所选日期前后各一天的窗口及其绝对时间边界。
    ///
    /// # Returns
    /// 日期超出 chrono 可表示范围时返回 `InvalidDate`。
    pub fn around(selected: NaiveDate, clock: &CivilClock) -> Result<Self, ServiceError> {
        let previous = selected
            .pred_opt()
            .ok_or_else(|| ServiceError::InvalidDate(format!("{selected} has no previous day")))?;
        let next = selected
            .succ_opt()
            .ok_or_else(|| ServiceError::InvalidDate(format!("{selected} has no next day")))?;
        let (_, end) = clock.day_bounds(next);

        Ok(Self {
            previous,
            selected,
            next,
            start: clock.local_midnight(previous),
            end,
        })
    }

    /// 按 前一天 → 所选日期 → 后一天 的顺序返回三天
    pub fn days(&self) -> [NaiveDate; 3] {
        [self.previous, self.selected, self.next]
    }
}

/// # Summary
/// 解析并校验 `YYYY-MM-DD` 格式的日期。
///
/// # Logic
/// 1. 严格要求 4-2-2 位数字格式。
/// 2. 解析为合法的公历日期。
/// 3. 与 `today` 相差不得超过 `max_offset_days` 天。
pub fn parse_civil_date(
    raw: &str,
    today: NaiveDate,
    max_offset_days: i64,
) -> Result<NaiveDate, ServiceError> {
    let well_formed = raw.len() == 10
        && raw.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ServiceError::InvalidDate(format!(
            "'{raw}' is not in YYYY-MM-DD format"
        )));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| ServiceError::InvalidDate(format!("'{raw}': {e}")))?;

    let span = Duration::try_days(max_offset_days);
    let latest = span
        .and_then(|d| today.checked_add_signed(d))
        .unwrap_or(NaiveDate::MAX);
    let earliest = span
        .and_then(|d| today.checked_sub_signed(d))
        .unwrap_or(NaiveDate::MIN);

    if date > latest {
        return Err(ServiceError::InvalidDate(format!(
            "Date cannot be more than {max_offset_days} days in the future"
        )));
    }
    if date < earliest {
        return Err(ServiceError::InvalidDate(format!(
            "Date cannot be more than {max_offset_days} days in the past"
        )));
    }
    Ok(date)
}
