//! # 小时网格
//!
//! 构建器、校验器与标签/单位格式化工具，以及把它们与固定时区、换算系数绑定在一起的 `GridContext`。

pub mod builder;
pub mod entity;
pub mod error;
pub mod format;
pub mod validator;

use chrono::{Datelike, NaiveDate};

use crate::config::{ConfigError, MarketConfig};
use crate::grid::entity::DayGrid;
use crate::grid::error::GridError;
use crate::market::entity::ObservationSet;
use crate::zone::CivilClock;

/// 启动时检查时区切换规则的年份范围 `[start, end)`
const RULE_CHECK_YEARS: (i32, i32) = (2024, 2036);
const SECONDS_PER_HOUR: i32 = 3600;

/// # Summary
/// 网格计算所需的全部进程级参数。
///
/// # Invariants
/// - 显式传入每一次构建与校验调用，不存在全局可变配置。
/// - 只读且可复制，不同日期的网格可以并发构建。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridContext {
    clock: CivilClock,
    conversion_factor: f64,
    fall_back_month: u32,
}

impl GridContext {
    pub fn new(clock: CivilClock, conversion_factor: f64, fall_back_month: u32) -> Self {
        Self {
            clock,
            conversion_factor,
            fall_back_month,
        }
    }

    /// # Summary
    /// 从市场配置构建上下文。
    ///
    /// # Logic
    /// 1. 校验数值范围并加载时区。
    /// 2. 检查时区切换规则：每次切换必须恰好一小时，回拨必须发生在 `fall_back_month`。
    ///
    /// # Returns
    /// 时区未知、切换规则不受支持或数值非法时返回 `ConfigError`，调用方应终止启动。
    pub fn from_config(config: &MarketConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = CivilClock::from_name(&config.timezone)?;
        check_transitions(&clock, config.fall_back_month)?;
        Ok(Self::new(
            clock,
            config.conversion_factor,
            config.fall_back_month,
        ))
    }

    pub fn clock(&self) -> &CivilClock {
        &self.clock
    }

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }

    pub fn fall_back_month(&self) -> u32 {
        self.fall_back_month
    }

    /// 构建网格 (不做长度校验)
    pub fn build(&self, date: NaiveDate, observations: &ObservationSet) -> DayGrid {
        builder::build_day_grid(self, date, observations)
    }

    /// 独立计算预期小时数
    pub fn expected_hour_count(&self, date: NaiveDate) -> usize {
        validator::expected_hour_count(&self.clock, date)
    }

    /// # Summary
    /// 构建网格并用校验器交叉核对长度。
    pub fn build_verified(
        &self,
        date: NaiveDate,
        observations: &ObservationSet,
    ) -> Result<DayGrid, GridError> {
        let grid = self.build(date, observations);
        validator::verify_hour_count(&self.clock, &grid)?;
        Ok(grid)
    }
}

/// # Summary
/// 确认时区规则落在网格构建器与校验器的假设之内。
///
/// # Invariants
/// - 构建器按整点遍历，非整小时切换会使空洞小时无法与下一小时重合。
/// - 标签只在 `fall_back_month` 内添加 A / B 后缀，月份不符会产生两个相同的标签。
fn check_transitions(clock: &CivilClock, fall_back_month: u32) -> Result<(), ConfigError> {
    let (start, end) = RULE_CHECK_YEARS;
    let (Some(from), Some(until)) = (
        NaiveDate::from_ymd_opt(start, 1, 1),
        NaiveDate::from_ymd_opt(end, 1, 1),
    ) else {
        return Ok(());
    };

    for transition in clock.transitions(from, until) {
        if transition.delta_secs.abs() != SECONDS_PER_HOUR {
            return Err(ConfigError::UnsupportedTransition {
                zone: clock.name().to_string(),
                date: transition.date,
                delta_secs: transition.delta_secs,
            });
        }
        if transition.delta_secs < 0 && transition.date.month() != fall_back_month {
            return Err(ConfigError::FallBackMonthMismatch {
                zone: clock.name().to_string(),
                configured: fall_back_month,
                actual: transition.date.month(),
            });
        }
    }
    Ok(())
}
