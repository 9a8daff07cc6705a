use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use strompreis_core::config::FeedConfig;
use strompreis_core::market::entity::MarketObservation;
use strompreis_core::market::error::MarketError;
use strompreis_core::market::port::MarketDataProvider;
use tracing::{debug, warn};

/// 上游返回的价格单位
const EXPECTED_UNIT: &str = "Eur/MWh";

/// # Summary
/// aWATTar 日前电价提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，超时与重试次数来自 `FeedConfig`。
/// - 只对网络错误、超时与 5xx 状态码重试。
#[derive(Clone)]
pub struct AwattarProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    api_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl AwattarProvider {
    /// # Summary
    /// 创建一个新的 AwattarProvider 实例。
    ///
    /// # Logic
    /// 1. 确保 rustls 已安装进程级加密后端。
    /// 2. 按配置设置请求超时与 User-Agent。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `config`: 上游接口配置。
    ///
    /// # Returns
    /// 客户端构建失败时返回 `MarketError::Network`。
    pub fn new(config: &FeedConfig) -> Result<Self, MarketError> {
        install_crypto_provider();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("strompreis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// 单次请求，不做重试
    async fn fetch_once(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketObservation>, MarketError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[
                ("start", start.timestamp_millis()),
                ("end", end.timestamp_millis()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        if !resp.status().is_success() {
            return Err(MarketError::Status(resp.status().as_u16()));
        }

        let body: AwattarResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        Ok(body.into_observations())
    }
}

fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

fn map_transport_error(err: reqwest::Error) -> MarketError {
    if err.is_timeout() {
        MarketError::Timeout
    } else {
        MarketError::Network(err.to_string())
    }
}

fn is_retryable(err: &MarketError) -> bool {
    match err {
        MarketError::Network(_) | MarketError::Timeout => true,
        MarketError::Status(code) => *code >= 500,
        MarketError::Parse(_) => false,
    }
}

/// # Summary
/// aWATTar 响应顶层结构。
///
/// # Invariants
/// - 映射自 `/v1/marketdata` 接口；缺少 `data` 视为空列表。
#[derive(Deserialize, Debug)]
struct AwattarResponse {
    data: Option<Vec<AwattarEntry>>,
}

/// aWATTar 单条小时电价
#[derive(Deserialize, Debug)]
struct AwattarEntry {
    // 小时开始时刻 (UTC 毫秒)
    start_timestamp: i64,
    // 价格，单位见 unit
    marketprice: f64,
    unit: Option<String>,
}

impl AwattarResponse {
    fn into_observations(self) -> Vec<MarketObservation> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .map(|entry| {
                if let Some(unit) = entry.unit.as_deref().filter(|u| *u != EXPECTED_UNIT) {
                    warn!(unit, start = entry.start_timestamp, "Unexpected price unit");
                }
                MarketObservation {
                    instant_ms: entry.start_timestamp,
                    price_eur_per_mwh: entry.marketprice,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for AwattarProvider {
    /// # Summary
    /// 从 aWATTar 抓取 `[start, end)` 的日前电价。
    ///
    /// # Logic
    /// 1. 以毫秒时间戳作为 start / end 查询参数发起请求。
    /// 2. 可重试的失败按线性退避重试，最多 `max_retries` 次。
    /// 3. 解析响应中的 data 列表为观测值。
    ///
    /// # Arguments
    /// * `start`: 开始时间。
    /// * `end`: 结束时间。
    ///
    /// # Returns
    /// 成功返回观测值列表，失败返回 MarketError。
    async fn fetch_market_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketObservation>, MarketError> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(start, end).await {
                Ok(observations) => {
                    debug!(
                        points = observations.len(),
                        attempt, "Fetched market data"
                    );
                    return Ok(observations);
                }
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    attempt += 1;
                    warn!(%err, attempt, max_retries = self.max_retries, "Market data fetch failed, retrying");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_marketdata_payload() {
        let payload = r#"{
            "object": "list",
            "data": [
                {"start_timestamp": 1761433200000, "end_timestamp": 1761436800000, "marketprice": 85.5, "unit": "Eur/MWh"},
                {"start_timestamp": 1761436800000, "end_timestamp": 1761440400000, "marketprice": -3.1, "unit": "Eur/MWh"}
            ],
            "url": "/at/v1/marketdata"
        }"#;
        let body: AwattarResponse = serde_json::from_str(payload).unwrap();
        let observations = body.into_observations();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].instant_ms, 1761433200000);
        assert_eq!(observations[0].price_eur_per_mwh, 85.5);
        assert_eq!(observations[1].price_eur_per_mwh, -3.1);
    }

    #[test]
    fn test_missing_data_is_empty() {
        let body: AwattarResponse = serde_json::from_str(r#"{"object": "list"}"#).unwrap();
        assert!(body.into_observations().is_empty());
    }

    #[test]
    fn test_retry_policy() {
        assert!(is_retryable(&MarketError::Timeout));
        assert!(is_retryable(&MarketError::Status(503)));
        assert!(!is_retryable(&MarketError::Status(404)));
        assert!(!is_retryable(&MarketError::Parse("bad".into())));
    }
}
