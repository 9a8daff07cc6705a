use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 全局应用配置
///
/// # Invariants
/// - 时区与换算系数是进程级固定值，启动后不再变化，并显式传递给网格构建器。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market: MarketConfig,
    pub feed: FeedConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域访问的前端来源
    pub cors_origins: Vec<String>,
}

/// 电价网格相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// IANA 时区名称，例如 `Europe/Vienna`。
    /// 只支持每次切换恰好一小时的时区 (启动时检查)。
    pub timezone: String,
    /// EUR/MWh → ct/kWh 的换算系数
    pub conversion_factor: f64,
    /// 冬令时回拨发生的月份，仅在该月为重复小时添加 A/B 后缀，
    /// 必须与时区的实际回拨月份一致 (启动时检查)
    pub fall_back_month: u32,
    /// 允许查询的日期距今天的最大天数 (前后对称)
    pub max_date_offset_days: i64,
}

/// 上游行情接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    /// 失败后的额外重试次数 (0 表示不重试)
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// 默认日志级别，`RUST_LOG` 优先
    pub level: String,
    /// 若设置，则额外按天滚动写入该目录
    pub directory: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Vienna".to_string(),
            conversion_factor: 10.0,
            fall_back_month: 10,
            max_date_offset_days: 365,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.awattar.at/v1/marketdata".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// # Summary
/// 配置错误枚举。
///
/// # Invariants
/// - 只会在启动阶段出现，属于致命错误，不会作为单次请求的失败返回。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 时区名称无法在 tz 数据库中找到
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
    /// 换算系数必须是有限正数
    #[error("Invalid conversion factor: {0}")]
    InvalidConversionFactor(f64),
    /// 月份必须在 1..=12 之间
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
    /// 时区存在非整小时的偏移切换，小时网格无法表示
    #[error("Timezone {zone} shifts by {delta_secs}s on {date}; only whole-hour transitions are supported")]
    UnsupportedTransition {
        zone: String,
        date: NaiveDate,
        delta_secs: i32,
    },
    /// 时区的实际回拨月份与配置不一致
    #[error("Timezone {zone} falls back in month {actual}, but fall_back_month is {configured}")]
    FallBackMonthMismatch {
        zone: String,
        configured: u32,
        actual: u32,
    },
}

impl MarketConfig {
    /// # Summary
    /// 校验市场配置的数值范围。
    ///
    /// # Logic
    /// 1. 换算系数必须为有限正数。
    /// 2. 回拨月份必须是合法月份。
    ///
    /// # Returns
    /// 合法返回 `Ok(())`，否则返回 `ConfigError`。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.conversion_factor.is_finite() || self.conversion_factor <= 0.0 {
            return Err(ConfigError::InvalidConversionFactor(self.conversion_factor));
        }
        if !(1..=12).contains(&self.fall_back_month) {
            return Err(ConfigError::InvalidMonth(self.fall_back_month));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.market.timezone, "Europe/Vienna");
        assert_eq!(config.market.conversion_factor, 10.0);
        assert_eq!(config.market.fall_back_month, 10);
        assert_eq!(config.feed.api_url, "https://api.awattar.at/v1/marketdata");
        assert_eq!(config.feed.timeout_secs, 30);
        assert!(config.log.directory.is_none());
    }

    #[test]
    fn test_market_config_validation() {
        let mut market = MarketConfig::default();
        assert!(market.validate().is_ok());

        market.conversion_factor = 0.0;
        assert_eq!(
            market.validate(),
            Err(ConfigError::InvalidConversionFactor(0.0))
        );

        market.conversion_factor = 10.0;
        market.fall_back_month = 13;
        assert_eq!(market.validate(), Err(ConfigError::InvalidMonth(13)));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.market.timezone, "Europe/Vienna");
    }
}
