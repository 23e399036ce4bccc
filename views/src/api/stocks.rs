//! Stock list, detail and maintenance handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway::stock_info::{Stock, StockQuery};
use serde::Deserialize;
use shared::envelope::Envelope;
use shared::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Page};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::sse;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub market: Option<String>,
    pub market_type: Option<String>,
    pub sector: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl From<ListParams> for StockQuery {
    fn from(params: ListParams) -> Self {
        StockQuery {
            ticker: params.ticker,
            name: params.name,
            market: params.market,
            market_type: params.market_type,
            sector: params.sector,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

/// The upstream paginates this list itself; a failed call collapses to an
/// empty page rather than an error, so the table view always renders.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Envelope<Page<Stock>> {
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let query = StockQuery::from(params);

    match state.stock_info.stocks(&query).await {
        Ok(stocks) => Envelope::success(stocks),
        Err(err) => {
            tracing::warn!(error = %err, "stock list unavailable");
            Envelope::success(Page::empty(page, page_size))
        }
    }
}

pub async fn detail(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Envelope<Stock>> {
    match state.stock_info.stock(&ticker).await? {
        Some(stock) => Ok(Envelope::success(stock)),
        None => Err(ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("stock {ticker} not found"),
        }),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Envelope<Stock>> {
    Ok(Envelope::success(state.stock_info.update_stock(&ticker).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Envelope<()>> {
    state.stock_info.delete_stock(&ticker).await?;
    Ok(Envelope::success(()))
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchAllParams {
    pub market: Option<String>,
    pub delay: Option<String>,
}

/// Bulk-refresh progress stream. A failed open is an ordinary JSON error;
/// once the stream is attached, failures travel in-band.
pub async fn fetch_all(
    State(state): State<AppState>,
    Query(params): Query<FetchAllParams>,
) -> Response {
    match state
        .stock_info
        .fetch_all_stream(params.market.as_deref(), params.delay.as_deref())
        .await
    {
        Ok(stream) => sse::event_stream_response(stream),
        Err(err) => ApiError::from(err).into_response(),
    }
}
