//! Typed clients for the upstream services the BFF aggregates.
//!
//! One client per upstream. Each owns its base URL and timeouts, translates
//! transport and HTTP failures into [`error::GatewayError`], and never
//! retries; retry policy belongs to callers.

pub mod catalog;
pub mod client;
pub mod error;
pub mod historical_data;
pub mod indicators;
pub mod stock_info;

pub use catalog::{CatalogBatch, CatalogClient, CatalogSource};
pub use historical_data::HistoricalDataClient;
pub use indicators::IndicatorsClient;
pub use stock_info::StockInfoClient;
