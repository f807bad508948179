use crate::error::ApiError;
use async_trait::async_trait;
use core_types::{validate_interval, Candle};
use serde::Deserialize;

/// The abstract interface for a market-data source.
///
/// Returns exactly `limit` candles ordered oldest first, or an error. The
/// orchestrator treats a per-symbol failure here as recoverable.
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError>;
}

/// A market-data client for a Binance-compatible futures klines endpoint.
#[derive(Clone)]
pub struct MarketClient {
    client: reqwest::Client,
    base_url: String,
}

impl MarketClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

// Intermediate struct for deserializing klines from the Binance-style API:
// [open_time, open, high, low, close, volume, close_time, ...].
#[derive(Deserialize)]
struct RawKline(i64, String, String, String, String, String, i64, String, i64, String, String, String);

fn parse_price(raw: &str, field: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>()
        .map_err(|e| ApiError::Deserialization(format!("invalid {field} value {raw:?}: {e}")))
}

#[async_trait]
impl MarketApi for MarketClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        validate_interval(interval)?;

        let url = format!("{}/fapi/v1/klines", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("status {status}: {body}")));
        }

        let raw = response.json::<Vec<RawKline>>().await?;

        let candles = raw
            .into_iter()
            .map(|k| {
                Ok(Candle {
                    open_time: k.0,
                    open: parse_price(&k.1, "open")?,
                    high: parse_price(&k.2, "high")?,
                    low: parse_price(&k.3, "low")?,
                    close: parse_price(&k.4, "close")?,
                    volume: parse_price(&k.5, "volume")?,
                    close_time: k.6,
                })
            })
            .collect::<Result<Vec<Candle>, ApiError>>()?;

        tracing::debug!(symbol, interval, count = candles.len(), "fetched candles");

        if candles.len() < limit {
            return Err(ApiError::InvalidData(format!(
                "insufficient candles for {symbol}: got {}, need {limit}",
                candles.len()
            )));
        }

        Ok(candles)
    }
}
