use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use strompreis_core::common::time::TimeProvider;
use strompreis_core::grid::GridContext;
use strompreis_core::market::entity::ObservationSet;
use strompreis_core::market::port::MarketDataProvider;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::prices::{DayPrices, PriceMetadata, ThreeDayPrices};
use crate::window::{DateWindow, parse_civil_date};

/// # Summary
/// 三天电价查询服务。
///
/// # Invariants
/// - 每次查询只向上游发起一次覆盖完整三天窗口的抓取。
/// - 不缓存任何结果，相同输入与相同上游数据得到相同输出。
/// - "今天" 由注入的 `TimeProvider` 决定，并按配置时区换算为民用日期。
pub struct PriceService {
    // 上游行情数据源
    provider: Arc<dyn MarketDataProvider>,
    // 时区、换算系数等网格参数
    grid: GridContext,
    clock: Arc<dyn TimeProvider>,
    max_date_offset_days: i64,
}

impl PriceService {
    /// # Summary
    /// 初始化电价服务。
    ///
    /// # Arguments
    /// * `provider`: 上游行情数据源。
    /// * `grid`: 已校验的网格上下文。
    /// * `clock`: 时间供给器。
    /// * `max_date_offset_days`: 允许查询的日期距今天的最大天数。
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        grid: GridContext,
        clock: Arc<dyn TimeProvider>,
        max_date_offset_days: i64,
    ) -> Self {
        Self {
            provider,
            grid,
            clock,
            max_date_offset_days,
        }
    }

    pub fn grid(&self) -> &GridContext {
        &self.grid
    }

    /// 配置时区下的今天
    pub fn today(&self) -> NaiveDate {
        self.grid.clock().civil_date(self.clock.now())
    }

    /// 配置时区下的当前时间
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        let now = self.clock.now();
        now.with_timezone(&self.grid.clock().offset_at(now))
    }

    /// # Summary
    /// 解析并校验调用方传入的日期字符串。
    ///
    /// # Returns
    /// 格式非法或超出允许范围时返回 `ServiceError::InvalidDate`。
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate, ServiceError> {
        parse_civil_date(raw, self.today(), self.max_date_offset_days)
    }

    pub fn window(&self, selected: NaiveDate) -> Result<DateWindow, ServiceError> {
        DateWindow::around(selected, self.grid.clock())
    }

    /// # Summary
    /// 用已抓取的观测值构建某一天的网格，并交叉校验长度。
    pub fn day_prices(
        &self,
        date: NaiveDate,
        observations: &ObservationSet,
    ) -> Result<DayPrices, ServiceError> {
        let (start, end) = self.grid.clock().day_bounds(date);
        let own = observations.within(start..end);
        let grid = self.grid.build_verified(date, &own)?;
        info!(
            %date,
            hours = grid.len(),
            missing = grid.missing_hours(),
            dst = grid.has_dst_transition(),
            "Day grid built"
        );
        Ok(DayPrices::new(grid))
    }

    /// # Summary
    /// 查询所选日期及其前后各一天的小时电价。
    ///
    /// # Logic
    /// 1. 计算三天窗口的绝对时间范围。
    /// 2. 一次性向上游抓取整个范围的观测值，重复时刻以最后一条为准。
    /// 3. 按民用日边界拆分观测值，分别构建并校验三张网格。
    /// 4. 按需附加元数据。
    ///
    /// # Arguments
    /// * `selected`: 已通过校验的所选日期。
    /// * `include_metadata`: 是否附加处理元数据。
    ///
    /// # Returns
    /// 上游失败返回 `Upstream`，网格长度不一致返回 `Inconsistent`。
    pub async fn three_day_prices(
        &self,
        selected: NaiveDate,
        include_metadata: bool,
    ) -> Result<ThreeDayPrices, ServiceError> {
        let window = self.window(selected)?;
        info!(
            previous = %window.previous,
            selected = %window.selected,
            next = %window.next,
            "Fetching three-day prices"
        );

        let raw = self
            .provider
            .fetch_market_data(window.start, window.end)
            .await?;
        let received = raw.len();
        let observations: ObservationSet = raw.into_iter().collect();
        debug!(
            received,
            distinct = observations.len(),
            start = %window.start,
            end = %window.end,
            "Market data received"
        );

        let [previous, selected, next] = window.days();
        let mut prices = ThreeDayPrices {
            previous_day: self.day_prices(previous, &observations)?,
            selected_day: self.day_prices(selected, &observations)?,
            next_day: self.day_prices(next, &observations)?,
            metadata: None,
        };

        if include_metadata {
            prices.metadata = Some(PriceMetadata {
                timezone: self.grid.clock().name().to_string(),
                conversion_factor: self.grid.conversion_factor(),
                data_points_received: received,
                processing_timestamp: self.local_now(),
                hour_counts: prices.hour_counts(),
            });
        }
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use strompreis_core::common::time::FakeClockProvider;
    use strompreis_core::config::MarketConfig;
    use strompreis_core::grid::error::GridError;
    use strompreis_core::market::entity::MarketObservation;
    use strompreis_core::market::testing::StaticMarketData;

    fn service(observations: Vec<MarketObservation>) -> PriceService {
        let grid = GridContext::from_config(&MarketConfig::default()).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 10, 26, 9, 0, 0).unwrap();
        PriceService::new(
            Arc::new(StaticMarketData::new(observations)),
            grid,
            Arc::new(FakeClockProvider::new(now)),
            365,
        )
    }

    #[test]
    fn test_today_uses_configured_zone() {
        let grid = GridContext::from_config(&MarketConfig::default()).unwrap();
        // 23:30 UTC 在维也纳已是次日
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
        let service = PriceService::new(
            Arc::new(StaticMarketData::new(vec![])),
            grid,
            Arc::new(FakeClockProvider::new(now)),
            365,
        );
        assert_eq!(service.today(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_day_prices_ignores_neighbouring_days() {
        let service = service(vec![]);
        let day = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
        let (start, end) = service.grid().clock().day_bounds(day);
        let observations: ObservationSet = [
            MarketObservation::new(start - chrono::Duration::hours(1), 1.0),
            MarketObservation::new(start, 2.0),
            MarketObservation::new(end, 3.0),
        ]
        .into_iter()
        .collect();

        let prices = service.day_prices(day, &observations).unwrap();
        assert_eq!(prices.total_hours(), 25);
        assert_eq!(prices.missing_hours(), 24);
        assert_eq!(prices.hours()[0].price_eur_per_mwh, Some(2.0));
    }

    #[test]
    fn test_grid_error_maps_to_inconsistent() {
        let err = GridError::HourCountMismatch {
            date: NaiveDate::from_ymd_opt(2025, 10, 26).unwrap(),
            expected: 25,
            actual: 24,
        };
        assert!(matches!(
            ServiceError::from(err),
            ServiceError::Inconsistent(_)
        ));
    }
}
