//! # 本地时间网格构建器
//!
//! 按墙钟小时 (而不是固定的绝对时长) 遍历一个民用日，借此发现夏令时空洞与重复小时。
//! 按固定时长遍历会在切换日悄无声息地产生长度错误的结果。

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::debug;

use crate::grid::GridContext;
use crate::grid::entity::{DayGrid, HourlyPriceRecord};
use crate::grid::format::{format_label, to_ct_per_kwh};
use crate::market::entity::ObservationSet;
use crate::zone::Disambiguation;

/// 单个民用日最多遍历的墙钟小时数
pub const MAX_HOURS_PER_DAY: u32 = 26;

/// 待输出的一个小时槽位
struct Slot {
    wall_hour: u32,
    disambiguation: Option<Disambiguation>,
    instant: DateTime<Utc>,
    is_dst_transition: bool,
}

/// # Summary
/// 为指定民用日构建小时网格，并合并观测到的价格。
///
/// # Logic
/// 1. 计算次日本地零点作为遍历终点。
/// 2. 对每个墙钟小时 H 计算 instant(H, First) 与 instant(H+1, First)。
/// 3. 两者相等说明 H 落在夏令时空洞中：不输出记录，仅标记切换。
/// 4. 否则输出 H 的记录；H 与 H+1 的偏移不同则该记录标记为切换边界。
/// 5. 偏移减小 (回拨) 时 H 为重复小时，紧接着输出第二次出现的记录，
///    价格独立查询，标签分别带 `A` / `B`。
/// 6. instant(H, First) 到达次日零点时结束。
///
/// # Arguments
/// * `ctx`: 时区与换算参数。
/// * `date`: 民用日期。
/// * `observations`: 按时刻索引的观测价格，缺失的小时记为 `is_missing`。
///
/// # Returns
/// 按时刻递增排列的 `DayGrid`。
pub fn build_day_grid(
    ctx: &GridContext,
    date: NaiveDate,
    observations: &ObservationSet,
) -> DayGrid {
    let clock = ctx.clock();
    let (_, day_end) = clock.day_bounds(date);

    let mut records = Vec::with_capacity(25);
    let mut has_dst_transition = false;

    for wall_hour in 0..MAX_HOURS_PER_DAY {
        let current = clock.to_instant(date, wall_hour, Disambiguation::First);
        if current >= day_end {
            break;
        }

        let next = clock.to_instant(date, wall_hour + 1, Disambiguation::First);
        if current == next {
            debug!(%date, wall_hour, "Skipping non-existent hour during DST spring forward");
            has_dst_transition = true;
            continue;
        }

        let offset = clock.offset_at(current).local_minus_utc();
        let next_offset = clock.offset_at(next).local_minus_utc();
        let is_boundary = offset != next_offset;
        has_dst_transition |= is_boundary;

        let repeated = (next_offset < offset)
            .then(|| clock.to_instant(date, wall_hour, Disambiguation::Second))
            .filter(|second| *second != current);

        match repeated {
            Some(second) => {
                records.push(make_record(
                    ctx,
                    date,
                    observations,
                    Slot {
                        wall_hour,
                        disambiguation: Some(Disambiguation::First),
                        instant: current,
                        is_dst_transition: is_boundary,
                    },
                ));
                records.push(make_record(
                    ctx,
                    date,
                    observations,
                    Slot {
                        wall_hour,
                        disambiguation: Some(Disambiguation::Second),
                        instant: second,
                        is_dst_transition: false,
                    },
                ));
            }
            None => records.push(make_record(
                ctx,
                date,
                observations,
                Slot {
                    wall_hour,
                    disambiguation: None,
                    instant: current,
                    is_dst_transition: is_boundary,
                },
            )),
        }
    }

    debug!(
        %date,
        hours = records.len(),
        has_dst_transition,
        first = records.first().map(|r| r.hour_label.as_str()).unwrap_or("N/A"),
        last = records.last().map(|r| r.hour_label.as_str()).unwrap_or("N/A"),
        "Generated hourly grid"
    );

    DayGrid::new(date, records, has_dst_transition)
}

fn make_record(
    ctx: &GridContext,
    date: NaiveDate,
    observations: &ObservationSet,
    slot: Slot,
) -> HourlyPriceRecord {
    let price = observations.price_at(slot.instant);
    HourlyPriceRecord {
        instant_ms: slot.instant.timestamp_millis(),
        hour_label: format_label(
            slot.wall_hour,
            slot.disambiguation,
            date.month(),
            ctx.fall_back_month(),
        ),
        price_eur_per_mwh: price,
        price_ct_per_kwh: price.map(|p| to_ct_per_kwh(p, ctx.conversion_factor())),
        is_missing: price.is_none(),
        is_dst_transition: slot.is_dst_transition,
    }
}
