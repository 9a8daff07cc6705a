//! # `strompreis-feed` - 上游行情数据源
//!
//! `MarketDataProvider` 端口的网络实现。

pub mod awattar;
