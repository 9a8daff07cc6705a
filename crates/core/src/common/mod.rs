//! 跨领域共享的基础设施抽象。

pub mod time;
