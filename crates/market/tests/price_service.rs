use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use strompreis_core::common::time::FakeClockProvider;
use strompreis_core::config::MarketConfig;
use strompreis_core::grid::GridContext;
use strompreis_core::market::entity::MarketObservation;
use strompreis_core::market::error::MarketError;
use strompreis_core::market::testing::{FailingMarketData, StaticMarketData};
use strompreis_market::error::ServiceError;
use strompreis_market::service::PriceService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 26, 9, 0, 0).unwrap()
}

/// 帮助函数：为 `[start, end)` 内每个整点生成一条观测值，价格等于序号
fn hourly(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<MarketObservation> {
    let mut observations = Vec::new();
    let mut at = start;
    let mut price = 0.0;
    while at < end {
        observations.push(MarketObservation::new(at, price));
        at += Duration::hours(1);
        price += 1.0;
    }
    observations
}

fn service_with(provider: Arc<StaticMarketData>) -> PriceService {
    let grid = GridContext::from_config(&MarketConfig::default()).unwrap();
    PriceService::new(provider, grid, Arc::new(FakeClockProvider::new(now())), 365)
}

/// # Summary
/// 冬令时结束日前后三天的完整查询。
///
/// # Logic
/// 1. 上游覆盖整个 73 小时窗口。
/// 2. 三天分别为 24 / 25 / 24 小时，且无缺失。
/// 3. 只发起一次上游请求，请求范围即窗口边界。
#[tokio::test]
async fn test_three_days_around_fall_back() -> anyhow::Result<()> {
    let start = Utc.with_ymd_and_hms(2025, 10, 24, 22, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 10, 27, 23, 0, 0).unwrap();
    let provider = Arc::new(StaticMarketData::new(hourly(start, end)));
    let service = service_with(provider.clone());

    let prices = service.three_day_prices(date(2025, 10, 26), false).await?;

    assert_eq!(provider.calls(), 1);
    assert_eq!(provider.last_range(), Some((start, end)));
    assert_eq!(prices.previous_day.date, date(2025, 10, 25));
    assert_eq!(prices.selected_day.date, date(2025, 10, 26));
    assert_eq!(prices.next_day.date, date(2025, 10, 27));

    let counts: Vec<_> = prices.days().iter().map(|d| d.total_hours()).collect();
    assert_eq!(counts, vec![24, 25, 24]);
    assert!(prices.days().iter().all(|d| d.missing_hours() == 0));
    assert!(prices.metadata.is_none());

    // 第一天 24 条之后紧接着当天 00:00
    assert_eq!(prices.selected_day.hours()[0].price_eur_per_mwh, Some(24.0));
    let labels: Vec<_> = prices
        .selected_day
        .hours()
        .iter()
        .map(|h| h.hour_label.as_str())
        .collect();
    assert_eq!(&labels[..5], &["00:00", "01:00", "02:00A", "02:00B", "03:00"]);
    Ok(())
}

/// # Summary
/// 夏令时开始日的查询窗口只有 71 小时。
#[tokio::test]
async fn test_three_days_around_spring_forward() -> anyhow::Result<()> {
    let provider = Arc::new(StaticMarketData::new(vec![]));
    let service = service_with(provider.clone());

    let prices = service.three_day_prices(date(2025, 3, 30), false).await?;

    let (start, end) = provider.last_range().unwrap();
    assert_eq!((end - start).num_hours(), 71);
    assert_eq!(prices.selected_day.total_hours(), 23);
    assert_eq!(prices.selected_day.missing_hours(), 23);
    assert_eq!(prices.previous_day.total_hours(), 24);
    Ok(())
}

/// # Summary
/// 元数据按需附加，并统计去重前的原始数据点数。
#[tokio::test]
async fn test_metadata_is_opt_in() -> anyhow::Result<()> {
    let at = Utc.with_ymd_and_hms(2025, 10, 26, 5, 0, 0).unwrap();
    let provider = Arc::new(StaticMarketData::new(vec![
        MarketObservation::new(at, 10.0),
        MarketObservation::new(at, 11.0),
    ]));
    let service = service_with(provider);

    let prices = service.three_day_prices(date(2025, 10, 26), true).await?;
    let metadata = prices.metadata.clone().unwrap();

    assert_eq!(metadata.timezone, "Europe/Vienna");
    assert_eq!(metadata.conversion_factor, 10.0);
    assert_eq!(metadata.data_points_received, 2);
    assert_eq!(metadata.processing_timestamp, now());
    assert_eq!(
        (
            metadata.hour_counts.previous_day,
            metadata.hour_counts.selected_day,
            metadata.hour_counts.next_day
        ),
        (24, 25, 24)
    );

    // 重复时刻以最后一条为准
    let priced: Vec<_> = prices
        .selected_day
        .hours()
        .iter()
        .filter_map(|h| h.price_eur_per_mwh)
        .collect();
    assert_eq!(priced, vec![11.0]);
    Ok(())
}

/// # Summary
/// 上游失败原样透传为 Upstream 错误。
#[tokio::test]
async fn test_upstream_failure_is_propagated() {
    let grid = GridContext::from_config(&MarketConfig::default()).unwrap();
    let service = PriceService::new(
        Arc::new(FailingMarketData::new(MarketError::Timeout)),
        grid,
        Arc::new(FakeClockProvider::new(now())),
        365,
    );

    let result = service.three_day_prices(date(2025, 10, 26), false).await;
    assert_eq!(result, Err(ServiceError::Upstream(MarketError::Timeout)));
}

/// # Summary
/// 日期校验以配置时区的今天为基准。
#[test]
fn test_parse_date_range_is_relative_to_today() {
    let service = service_with(Arc::new(StaticMarketData::new(vec![])));

    assert_eq!(service.parse_date("2026-10-26"), Ok(date(2026, 10, 26)));
    assert!(matches!(
        service.parse_date("2026-10-27"),
        Err(ServiceError::InvalidDate(_))
    ));
    assert!(matches!(
        service.parse_date("26.10.2025"),
        Err(ServiceError::InvalidDate(_))
    ));
}
