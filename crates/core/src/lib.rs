//! # `strompreis-core` - 领域核心
//!
//! 不含任何 I/O 的纯计算核心与各层共享的契约：
//! - `zone`: 民用时间与绝对时刻的互相转换 (夏令时空洞、重复小时)。
//! - `grid`: 民用日小时网格的构建、长度校验与格式化。
//! - `market`: 上游电价观测值实体、数据源端口与错误。
//! - `config`: 全局配置模型。
//! - `common`: 时钟等基础抽象。

pub mod common;
pub mod config;
pub mod grid;
pub mod zone;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;

    #[cfg(any(test, feature = "test-utils"))]
    pub mod testing;
}
