//! # 预期小时数校验器
//!
//! 不生成任何记录，直接依据时区映射对每个墙钟小时分类计数，
//! 用来交叉核对网格构建器的输出长度。

use chrono::NaiveDate;
use tracing::error;

use crate::grid::entity::DayGrid;
use crate::grid::error::GridError;
use crate::zone::{CivilClock, WallHourKind};

/// # Summary
/// 独立计算某民用日真实存在的小时数。
///
/// # Logic
/// 空洞小时计 0，普通小时计 1，重复小时计 2。
pub fn expected_hour_count(clock: &CivilClock, date: NaiveDate) -> usize {
    (0..24)
        .map(|wall_hour| match clock.classify(date, wall_hour) {
            WallHourKind::Gap => 0,
            WallHourKind::Unique => 1,
            WallHourKind::Ambiguous => 2,
        })
        .sum()
}

/// # Summary
/// 校验网格长度与独立计算的小时数一致。
///
/// # Returns
/// 不一致时返回 `GridError::HourCountMismatch`，调用方必须拒绝该网格。
pub fn verify_hour_count(clock: &CivilClock, grid: &DayGrid) -> Result<(), GridError> {
    let expected = expected_hour_count(clock, grid.date());
    let actual = grid.len();
    if actual != expected {
        error!(
            date = %grid.date(),
            expected,
            actual,
            "Hour count mismatch"
        );
        return Err(GridError::HourCountMismatch {
            date: grid.date(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_counts_around_transitions() {
        let clock = CivilClock::from_name("Europe/Vienna").unwrap();
        let cases = [
            ((2025, 3, 29), 24),
            ((2025, 3, 30), 23),
            ((2025, 3, 31), 24),
            ((2025, 10, 25), 24),
            ((2025, 10, 26), 25),
            ((2025, 10, 27), 24),
        ];
        for ((y, m, d), expected) in cases {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            assert_eq!(expected_hour_count(&clock, date), expected, "{date}");
        }
    }

    #[test]
    fn test_mismatch_is_reported() {
        let clock = CivilClock::from_name("Europe/Vienna").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
        let truncated = DayGrid::new(date, Vec::new(), false);

        assert_eq!(
            verify_hour_count(&clock, &truncated),
            Err(GridError::HourCountMismatch {
                date,
                expected: 25,
                actual: 0,
            })
        );
    }
}
