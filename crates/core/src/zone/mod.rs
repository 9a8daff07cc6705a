//! # 民用时间 / 绝对时刻转换器
//!
//! 在 (民用日期, 墙钟小时, 消歧序号) 与 UTC 绝对时刻之间互相转换，
//! 时区规则由 `chrono-tz` 提供。网格构建器和小时数校验器都只通过此模块接触时区。

use std::cmp::{max, min};
use std::str::FromStr;

use chrono::offset::LocalResult;
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// 向前探测夏令时空洞之前有效偏移时最多回退的小时数
const GAP_PROBE_HOURS: i64 = 3;

/// # Summary
/// 重复墙钟时间的消歧序号。
///
/// # Invariants
/// - 对于非重复的小时，`Second` 与 `First` 解析到同一个时刻。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disambiguation {
    /// 第一次出现 (回拨前，偏移较大)
    First,
    /// 第二次出现 (回拨后，偏移较小)
    Second,
}

/// 某个墙钟小时在时区规则下的性质
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHourKind {
    /// 夏令时跳过的小时，不对应任何时刻
    Gap,
    /// 普通小时，恰好对应一个时刻
    Unique,
    /// 冬令时回拨的小时，对应两个时刻
    Ambiguous,
}

/// 绝对时刻对应的墙钟表示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub disambiguation: Disambiguation,
}

/// 某个民用日内发生的一次 UTC 偏移切换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub date: NaiveDate,
    /// 切换后偏移减去切换前偏移 (秒)，回拨为负
    pub delta_secs: i32,
}

/// # Summary
/// 绑定单一时区的转换器。
///
/// # Invariants
/// - 构造成功即代表时区规则可用，之后的转换不会失败。
/// - 不持有可变状态，可在线程间自由复制。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilClock {
    tz: Tz,
}

impl CivilClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// # Summary
    /// 按 IANA 名称加载时区。
    ///
    /// # Returns
    /// 未知时区返回 `ConfigError::UnknownTimezone`，调用方应视为启动失败。
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Tz::from_str(name)
            .map(Self::new)
            .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// 民用日期零点加上若干墙钟小时，超过 23 时自然滚入后续日期
    fn wall_time(date: NaiveDate, wall_hour: u32) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(wall_hour))
    }

    /// # Summary
    /// 判断某个墙钟小时是空洞、普通还是重复小时。
    ///
    /// # Logic
    /// 直接依据时区的本地 → UTC 映射结果分类，不依赖时刻比较。
    pub fn classify(&self, date: NaiveDate, wall_hour: u32) -> WallHourKind {
        match self.tz.from_local_datetime(&Self::wall_time(date, wall_hour)) {
            LocalResult::None => WallHourKind::Gap,
            LocalResult::Single(_) => WallHourKind::Unique,
            LocalResult::Ambiguous(_, _) => WallHourKind::Ambiguous,
        }
    }

    /// # Summary
    /// 将 (民用日期, 墙钟小时, 消歧序号) 转换为绝对时刻。
    ///
    /// # Logic
    /// 1. 普通小时：唯一映射。
    /// 2. 重复小时：按消歧序号取较早或较晚的时刻。
    /// 3. 空洞小时：沿用空洞之前的偏移，因此结果与空洞之后第一个真实小时的时刻相同。
    ///
    /// # Arguments
    /// * `date`: 民用日期。
    /// * `wall_hour`: 从该日零点起算的墙钟小时，24 即次日零点。
    /// * `disambiguation`: 消歧序号。
    pub fn to_instant(
        &self,
        date: NaiveDate,
        wall_hour: u32,
        disambiguation: Disambiguation,
    ) -> DateTime<Utc> {
        let local = Self::wall_time(date, wall_hour);
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(a, b) => {
                let (a, b) = (a.with_timezone(&Utc), b.with_timezone(&Utc));
                match disambiguation {
                    Disambiguation::First => min(a, b),
                    Disambiguation::Second => max(a, b),
                }
            }
            LocalResult::None => self.resolve_gap(local),
        }
    }

    fn resolve_gap(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let offset = (1..=GAP_PROBE_HOURS)
            .find_map(|back| {
                self.tz
                    .from_local_datetime(&(local - Duration::hours(back)))
                    .latest()
                    .map(|before| before.offset().fix())
            })
            .unwrap_or_else(|| self.tz.offset_from_utc_datetime(&local).fix());
        Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
    }

    /// # Summary
    /// 将绝对时刻转换为墙钟表示，并给出它是重复小时的第几次出现。
    pub fn to_civil(&self, instant: DateTime<Utc>) -> CivilTime {
        let naive = instant.with_timezone(&self.tz).naive_local();
        let disambiguation = match self.tz.from_local_datetime(&naive) {
            LocalResult::Ambiguous(a, b) => {
                let later = max(a.with_timezone(&Utc), b.with_timezone(&Utc));
                if instant == later {
                    Disambiguation::Second
                } else {
                    Disambiguation::First
                }
            }
            _ => Disambiguation::First,
        };
        CivilTime {
            date: naive.date(),
            hour: naive.hour(),
            minute: naive.minute(),
            disambiguation,
        }
    }

    /// 某一时刻实际生效的 UTC 偏移
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        self.tz.offset_from_utc_datetime(&instant.naive_utc()).fix()
    }

    /// 民用日期的本地零点
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        self.to_instant(date, 0, Disambiguation::First)
    }

    /// # Summary
    /// 民用日的绝对时间范围 `[本地零点, 次日本地零点)`。
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.local_midnight(date),
            self.to_instant(date, 24, Disambiguation::First),
        )
    }

    /// # Summary
    /// 列出 `[from, until)` 内每个发生偏移切换的民用日。
    ///
    /// # Logic
    /// 比较相邻两个本地零点的实际偏移，不同即说明当天发生了切换。
    pub fn transitions(&self, from: NaiveDate, until: NaiveDate) -> Vec<Transition> {
        let mut found = Vec::new();
        let mut previous = self.offset_at(self.local_midnight(from)).local_minus_utc();
        for date in from.iter_days().take_while(|d| *d < until) {
            let Some(next_day) = date.succ_opt() else {
                break;
            };
            let next = self.offset_at(self.local_midnight(next_day)).local_minus_utc();
            if next != previous {
                found.push(Transition {
                    date,
                    delta_secs: next - previous,
                });
            }
            previous = next;
        }
        found
    }

    /// 绝对时刻所在的民用日期
    pub fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vienna() -> CivilClock {
        CivilClock::from_name("Europe/Vienna").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unknown_zone_is_config_error() {
        assert_eq!(
            CivilClock::from_name("Europe/Atlantis"),
            Err(ConfigError::UnknownTimezone("Europe/Atlantis".to_string()))
        );
    }

    #[test]
    fn test_spring_forward_gap_collapses_onto_next_hour() {
        let clock = vienna();
        let day = date(2025, 3, 30);
        assert_eq!(clock.classify(day, 2), WallHourKind::Gap);

        let gap = clock.to_instant(day, 2, Disambiguation::First);
        let after = clock.to_instant(day, 3, Disambiguation::First);
        assert_eq!(gap, after);
        assert_eq!(after, Utc.with_ymd_and_hms(2025, 3, 30, 1, 0, 0).unwrap());

        let before = clock.to_instant(day, 1, Disambiguation::First);
        assert_eq!(clock.offset_at(before).local_minus_utc(), 3600);
        assert_eq!(clock.offset_at(gap).local_minus_utc(), 7200);
    }

    #[test]
    fn test_fall_back_hour_has_two_instants() {
        let clock = vienna();
        let day = date(2025, 10, 26);
        assert_eq!(clock.classify(day, 2), WallHourKind::Ambiguous);

        let first = clock.to_instant(day, 2, Disambiguation::First);
        let second = clock.to_instant(day, 2, Disambiguation::Second);
        assert_eq!(first, Utc.with_ymd_and_hms(2025, 10, 26, 0, 0, 0).unwrap());
        assert_eq!(second, Utc.with_ymd_and_hms(2025, 10, 26, 1, 0, 0).unwrap());

        let civil = clock.to_civil(second);
        assert_eq!(civil.date, day);
        assert_eq!(civil.hour, 2);
        assert_eq!(civil.disambiguation, Disambiguation::Second);
        assert_eq!(clock.to_civil(first).disambiguation, Disambiguation::First);
    }

    #[test]
    fn test_second_is_first_for_unique_hours() {
        let clock = vienna();
        let day = date(2025, 1, 15);
        assert_eq!(clock.classify(day, 13), WallHourKind::Unique);
        assert_eq!(
            clock.to_instant(day, 13, Disambiguation::First),
            clock.to_instant(day, 13, Disambiguation::Second)
        );
    }

    #[test]
    fn test_day_bounds_follow_civil_days() {
        let clock = vienna();
        let (start, end) = clock.day_bounds(date(2025, 3, 30));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 29, 23, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 30, 22, 0, 0).unwrap());
        assert_eq!((end - start).num_hours(), 23);

        let (start, end) = clock.day_bounds(date(2025, 10, 26));
        assert_eq!((end - start).num_hours(), 25);
    }

    #[test]
    fn test_transitions_in_a_year() {
        let clock = vienna();
        assert_eq!(
            clock.transitions(date(2025, 1, 1), date(2026, 1, 1)),
            vec![
                Transition {
                    date: date(2025, 3, 30),
                    delta_secs: 3600,
                },
                Transition {
                    date: date(2025, 10, 26),
                    delta_secs: -3600,
                },
            ]
        );

        let kolkata = CivilClock::from_name("Asia/Kolkata").unwrap();
        assert!(kolkata.transitions(date(2025, 1, 1), date(2026, 1, 1)).is_empty());
    }

    #[test]
    fn test_round_trip_through_civil_time() {
        let clock = vienna();
        let instant = Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap();
        let civil = clock.to_civil(instant);
        assert_eq!(civil.hour, 12);
        assert_eq!(
            clock.to_instant(civil.date, civil.hour, civil.disambiguation),
            instant
        );
        assert_eq!(clock.civil_date(instant), date(2025, 6, 15));
    }
}
