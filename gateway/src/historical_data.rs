//! Client for the historical market-data upstream.

use crate::client::{EventStream, UpstreamClient};
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// One OHLCV bar as served by the upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KlineBar {
    pub date: String,
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: Option<f64>,
    pub adj_close: Option<f64>,
    pub data_source: String,
}

#[derive(Debug, Clone, Default)]
pub struct KlineQuery {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
}

impl KlineQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(v) = &self.period {
            params.push(("period", v.clone()));
        }
        if let Some(v) = &self.start_date {
            params.push(("start_date", v.clone()));
        }
        if let Some(v) = &self.end_date {
            params.push(("end_date", v.clone()));
        }
        if let Some(v) = self.limit {
            params.push(("limit", v.to_string()));
        }
        params
    }
}

/// The series payload nests the bars one level down: `{data: {data: [...]}}`.
#[derive(Debug, Default, Deserialize)]
struct KlineSeries {
    #[serde(default)]
    data: Vec<KlineBar>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UpdateCounts {
    pub updated_count: u64,
    pub new_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub total_count: u64,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub missing_dates: Option<Vec<String>>,
    pub coverage_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeleteCount {
    pub deleted_count: u64,
}

#[derive(Clone)]
pub struct HistoricalDataClient {
    inner: UpstreamClient,
}

impl HistoricalDataClient {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        HistoricalDataClient {
            inner: UpstreamClient::new("historical-data", base_url, timeout),
        }
    }

    pub async fn kline_data(&self, ticker: &str, query: &KlineQuery) -> Result<Vec<KlineBar>> {
        let series: Option<KlineSeries> = self
            .inner
            .get_json(&format!("historical-data/{ticker}"), &query.to_params())
            .await?;
        Ok(series.unwrap_or_default().data)
    }

    pub async fn update(
        &self,
        ticker: &str,
        period: Option<&str>,
        incremental: bool,
        data_source: Option<&str>,
    ) -> Result<UpdateCounts> {
        let mut params = vec![("incremental", incremental.to_string())];
        if let Some(period) = period {
            params.push(("period", period.to_string()));
        }
        if let Some(source) = data_source {
            params.push(("data_source", source.to_string()));
        }

        let counts = self
            .inner
            .post_json(
                &format!("historical-data/{ticker}/update"),
                &params,
                None,
                None,
            )
            .await?;
        Ok(counts.unwrap_or_default())
    }

    pub async fn statistics(&self, ticker: &str, period: Option<&str>) -> Result<SeriesStatistics> {
        let mut params = Vec::new();
        if let Some(period) = period {
            params.push(("period", period.to_string()));
        }

        let stats = self
            .inner
            .get_json(&format!("historical-data/{ticker}/statistics"), &params)
            .await?;
        Ok(stats.unwrap_or_default())
    }

    pub async fn delete(&self, ticker: &str, query: &KlineQuery) -> Result<DeleteCount> {
        let deleted = self
            .inner
            .delete_json(&format!("historical-data/{ticker}"), &query.to_params())
            .await?;
        Ok(deleted.unwrap_or_default())
    }

    /// Opens the progress stream for a batch refresh of selected tickers.
    pub async fn batch_update_stream(
        &self,
        tickers: &[String],
        query: &KlineQuery,
    ) -> Result<EventStream> {
        let mut params = query.to_params();
        params.push(("tickers", tickers.join(",")));
        self.inner
            .open_event_stream(Method::GET, "historical-data/batch", &params)
            .await
    }

    /// Opens the progress stream for a refresh across the whole universe.
    pub async fn full_update_stream(&self, query: &KlineQuery) -> Result<EventStream> {
        self.inner
            .open_event_stream(Method::GET, "historical-data/full-update", &query.to_params())
            .await
    }
}
