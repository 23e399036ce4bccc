//! The BFF engine: fans requests out to the upstream services, normalizes
//! their answers into frontend-shaped views, and pipes progress streams
//! through unchanged.

pub mod api;
pub mod config;
pub mod error;
pub mod fanout;
pub mod metrics_defs;
pub mod normalize;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};
use gateway::catalog::{CatalogClient, CatalogSource};
use gateway::historical_data::HistoricalDataClient;
use gateway::indicators::IndicatorsClient;
use gateway::stock_info::StockInfoClient;
use tokio::net::TcpListener;

use crate::config::Config;

/// All routes hang off this prefix; the frontend proxies it verbatim.
pub const API_PREFIX: &str = "/api/bff/v1/views";

#[derive(Clone)]
pub struct AppState {
    pub stock_info: StockInfoClient,
    pub historical_data: HistoricalDataClient,
    pub indicators: IndicatorsClient,
    pub catalog_python: CatalogClient,
    pub catalog_node: CatalogClient,
    pub catalog_rust: CatalogClient,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.timeouts.request();
        let upstreams = &config.upstreams;
        AppState {
            stock_info: StockInfoClient::new(
                upstreams.stock_info.clone(),
                timeout,
                config.timeouts.slow_request(),
            ),
            historical_data: HistoricalDataClient::new(upstreams.historical_data.clone(), timeout),
            indicators: IndicatorsClient::new(upstreams.indicators.clone(), timeout),
            catalog_python: CatalogClient::new(
                CatalogSource::Python,
                upstreams.catalog_python.clone(),
                timeout,
            ),
            catalog_node: CatalogClient::new(
                CatalogSource::Node,
                upstreams.catalog_node.clone(),
                timeout,
            ),
            catalog_rust: CatalogClient::new(
                CatalogSource::Rust,
                upstreams.catalog_rust.clone(),
                timeout,
            ),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let views = Router::new()
        .route("/dashboard", get(api::dashboard::dashboard))
        .route("/items", get(api::items::items))
        .route("/stocks", get(api::stocks::list))
        .route("/stocks/fetch-all", post(api::stocks::fetch_all))
        .route(
            "/stocks/{ticker}",
            get(api::stocks::detail).delete(api::stocks::delete),
        )
        .route("/stocks/{ticker}/update", post(api::stocks::update))
        .route(
            "/historical-data/batch",
            get(api::historical_data::batch_update),
        )
        .route(
            "/historical-data/full-update",
            get(api::historical_data::full_update),
        )
        .route(
            "/historical-data/{ticker}",
            get(api::historical_data::kline).delete(api::historical_data::delete),
        )
        .route(
            "/historical-data/{ticker}/statistics",
            get(api::historical_data::statistics),
        )
        .route(
            "/historical-data/{ticker}/update",
            post(api::historical_data::update),
        )
        .route("/indicators/supported", get(api::indicators::supported))
        .route(
            "/indicators/batch-calculate",
            get(api::indicators::batch_calculate),
        )
        .route("/indicators/{ticker}", get(api::indicators::query))
        .route(
            "/indicators/{ticker}/calculate",
            post(api::indicators::calculate),
        );

    Router::new().nest(API_PREFIX, views).with_state(state)
}

pub async fn serve(config: Config) -> std::io::Result<()> {
    let state = AppState::from_config(&config);
    let app = build_router(state);

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "bff listening");
    axum::serve(listener, app).await
}
