//! Client for the technical-indicators upstream.

use crate::client::{EventStream, UpstreamClient};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// One computed indicator value. `value` is either a scalar or a map of
/// series (e.g. MACD emits `{dif, dea, macd}`), so it stays a JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: String,
    pub timestamp: String,
    pub indicator_name: String,
    pub value: serde_json::Value,
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedIndicator {
    pub name: String,
    pub display_name: String,
    /// trend | momentum | volatility | volume
    pub category: String,
    pub description: Option<String>,
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorQuery {
    pub indicator_name: Option<String>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl IndicatorQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(v) = &self.indicator_name {
            params.push(("indicator_name", v.clone()));
        }
        if let Some(v) = &self.period {
            params.push(("period", v.clone()));
        }
        if let Some(v) = &self.start_date {
            params.push(("start_date", v.clone()));
        }
        if let Some(v) = &self.end_date {
            params.push(("end_date", v.clone()));
        }
        params
    }
}

#[derive(Clone)]
pub struct IndicatorsClient {
    inner: UpstreamClient,
}

impl IndicatorsClient {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        IndicatorsClient {
            inner: UpstreamClient::new("indicators", base_url, timeout),
        }
    }

    pub async fn supported(&self) -> Result<Vec<SupportedIndicator>> {
        let indicators = self.inner.get_json("indicators/supported", &[]).await?;
        Ok(indicators.unwrap_or_default())
    }

    pub async fn calculate(
        &self,
        ticker: &str,
        indicator_name: &str,
        params: Option<&serde_json::Value>,
    ) -> Result<Vec<IndicatorPoint>> {
        let query = [("indicator_name", indicator_name.to_string())];
        let points = self
            .inner
            .post_json(
                &format!("indicators/{ticker}/calculate"),
                &query,
                params,
                None,
            )
            .await?;
        Ok(points.unwrap_or_default())
    }

    pub async fn query(&self, ticker: &str, query: &IndicatorQuery) -> Result<Vec<IndicatorPoint>> {
        let points = self
            .inner
            .get_json(&format!("indicators/{ticker}"), &query.to_params())
            .await?;
        Ok(points.unwrap_or_default())
    }

    /// Opens the progress stream for batch indicator computation.
    pub async fn batch_calculate_stream(
        &self,
        tickers: &[String],
        indicator_names: &[String],
    ) -> Result<EventStream> {
        let params = [
            ("tickers", tickers.join(",")),
            ("indicator_names", indicator_names.join(",")),
        ];
        self.inner
            .open_event_stream(Method::GET, "indicators/batch-calculate", &params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_value_may_be_scalar_or_map() {
        let scalar: IndicatorPoint = serde_json::from_str(
            r#"{"date": "2024-05-01", "timestamp": "2024-05-01T00:00:00Z",
                "indicator_name": "rsi", "value": 63.2}"#,
        )
        .unwrap();
        assert!(scalar.value.is_f64());

        let map: IndicatorPoint = serde_json::from_str(
            r#"{"date": "2024-05-01", "timestamp": "2024-05-01T00:00:00Z",
                "indicator_name": "macd",
                "value": {"dif": 0.4, "dea": 0.3, "macd": 0.2}}"#,
        )
        .unwrap();
        assert!(map.value.is_object());
    }
}
