use chrono::NaiveDate;
use thiserror::Error;

/// # Summary
/// 网格内部一致性错误。
///
/// # Invariants
/// - 由系统内部原因导致，绝不能把不一致的网格返回给调用方；与上游数据错误严格区分。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// 构建出的小时数与独立计算的预期小时数不一致
    #[error("Hour count mismatch for {date}: expected {expected} hours, got {actual} hours")]
    HourCountMismatch {
        date: NaiveDate,
        expected: usize,
        actual: usize,
    },
}
