//! Client for the stock-info upstream.

use crate::client::{EventStream, UpstreamClient};
use crate::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use shared::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Page};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Exchange-level market (NASDAQ, NYSE, SSE, SZSE, ...).
    pub market: Option<String>,
    /// Market class the frontend groups by (A股, 港股, 美股).
    pub market_type: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub data_source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct StockQuery {
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub market: Option<String>,
    pub market_type: Option<String>,
    pub sector: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl StockQuery {
    pub fn market_type(market_type: impl Into<String>) -> Self {
        StockQuery {
            market_type: Some(market_type.into()),
            ..StockQuery::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(v) = &self.ticker {
            params.push(("ticker", v.clone()));
        }
        if let Some(v) = &self.name {
            params.push(("name", v.clone()));
        }
        if let Some(v) = &self.market {
            params.push(("market", v.clone()));
        }
        if let Some(v) = &self.market_type {
            params.push(("market_type", v.clone()));
        }
        if let Some(v) = &self.sector {
            params.push(("sector", v.clone()));
        }
        if let Some(v) = self.page {
            params.push(("page", v.to_string()));
        }
        if let Some(v) = self.page_size {
            params.push(("page_size", v.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub total_providers: usize,
    #[serde(default)]
    pub providers: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub market_coverage: HashMap<String, Vec<String>>,
}

#[derive(Clone)]
pub struct StockInfoClient {
    inner: UpstreamClient,
    /// Stock updates reach out to external data providers and can run long.
    slow_timeout: Duration,
}

impl StockInfoClient {
    pub fn new(base_url: Url, timeout: Duration, slow_timeout: Duration) -> Self {
        StockInfoClient {
            inner: UpstreamClient::new("stock-info", base_url, timeout),
            slow_timeout,
        }
    }

    pub async fn stocks(&self, query: &StockQuery) -> Result<Page<Stock>> {
        let page = self.inner.get_json("stocks", &query.to_params()).await?;
        Ok(page.unwrap_or_else(|| {
            Page::empty(
                query.page.unwrap_or(DEFAULT_PAGE),
                query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            )
        }))
    }

    pub async fn stock(&self, ticker: &str) -> Result<Option<Stock>> {
        self.inner.get_json(&format!("stocks/{ticker}"), &[]).await
    }

    /// Creates or refreshes a stock from external data providers.
    pub async fn update_stock(&self, ticker: &str) -> Result<Stock> {
        let operation = format!("stocks/{ticker}/update");
        let stock: Option<Stock> = self
            .inner
            .post_json(&operation, &[], None, Some(self.slow_timeout))
            .await?;

        stock.ok_or_else(|| GatewayError::Unknown {
            upstream: self.inner.name(),
            operation,
            message: "update returned no stock payload".to_string(),
        })
    }

    pub async fn delete_stock(&self, ticker: &str) -> Result<()> {
        self.inner
            .delete_json::<serde_json::Value>(&format!("stocks/{ticker}"), &[])
            .await?;
        Ok(())
    }

    pub async fn provider_status(&self) -> Result<ProviderStatus> {
        let status = self.inner.get_json("providers/status", &[]).await?;
        Ok(status.unwrap_or_default())
    }

    /// Opens the bulk-refresh progress stream.
    pub async fn fetch_all_stream(
        &self,
        market: Option<&str>,
        delay: Option<&str>,
    ) -> Result<EventStream> {
        let mut params = Vec::new();
        if let Some(market) = market {
            params.push(("market", market.to_string()));
        }
        if let Some(delay) = delay {
            params.push(("delay", delay.to_string()));
        }
        self.inner
            .open_event_stream(Method::POST, "stocks/fetch-all", &params)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_omits_absent_filters() {
        let query = StockQuery {
            market_type: Some("A股".to_string()),
            page: Some(1),
            page_size: Some(1),
            ..StockQuery::default()
        };

        let params = query.to_params();
        assert_eq!(
            params,
            vec![
                ("market_type", "A股".to_string()),
                ("page", "1".to_string()),
                ("page_size", "1".to_string()),
            ]
        );
    }

    #[test]
    fn stock_tolerates_sparse_payloads() {
        let raw = r#"{"ticker": "AAPL", "last_updated": "2024-05-01T08:00:00Z"}"#;
        let stock: Stock = serde_json::from_str(raw).unwrap();

        assert_eq!(stock.ticker, "AAPL");
        assert!(stock.name.is_none());
        assert!(stock.created_at.is_none());
        assert!(stock.last_updated.is_some());
    }
}
