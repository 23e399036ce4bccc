//! Technical-indicator view handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway::indicators::{IndicatorPoint, IndicatorQuery, SupportedIndicator};
use serde::{Deserialize, Serialize};
use shared::envelope::Envelope;
use shared::pagination::paginate;

use crate::AppState;
use crate::api::{page_selection, split_csv};
use crate::error::{ApiError, ApiResult};
use crate::sse;

pub async fn supported(State(state): State<AppState>) -> Envelope<Vec<SupportedIndicator>> {
    match state.indicators.supported().await {
        Ok(indicators) => Envelope::success(indicators),
        Err(err) => {
            tracing::warn!(error = %err, "supported indicator list unavailable");
            Envelope::success(Vec::new())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CalculateParams {
    pub indicator_name: String,
}

pub async fn calculate(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<CalculateParams>,
    body: Option<Json<serde_json::Value>>,
) -> ApiResult<Envelope<Vec<IndicatorPoint>>> {
    let body = body.map(|Json(value)| value);
    let points = state
        .indicators
        .calculate(&ticker, &params.indicator_name, body.as_ref())
        .await?;
    Ok(Envelope::success(points))
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub indicator_name: Option<String>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// The flat answer shape, used when the caller sent no paging parameters.
#[derive(Debug, Serialize)]
pub struct FlatIndicators {
    pub ticker: String,
    pub indicator_name: Option<String>,
    pub count: usize,
    pub data: Vec<IndicatorPoint>,
}

/// Flat or paginated, depending on the caller's paging parameters. An
/// upstream failure yields the same shape, empty.
pub async fn query(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<QueryParams>,
) -> Response {
    let query = IndicatorQuery {
        indicator_name: params.indicator_name.clone(),
        period: params.period,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let data = match state.indicators.query(&ticker, &query).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(%ticker, error = %err, "indicator series unavailable");
            Vec::new()
        }
    };

    match page_selection(params.page, params.page_size) {
        Some((page, page_size)) => Envelope::success(paginate(data, page, page_size)).into_response(),
        None => Envelope::success(FlatIndicators {
            ticker,
            indicator_name: params.indicator_name,
            count: data.len(),
            data,
        })
        .into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchCalculateParams {
    pub tickers: Option<String>,
    pub indicator_names: Option<String>,
}

/// Progress stream for batch indicator computation over several tickers.
pub async fn batch_calculate(
    State(state): State<AppState>,
    Query(params): Query<BatchCalculateParams>,
) -> Response {
    let tickers = split_csv(params.tickers.as_deref());
    let indicator_names = split_csv(params.indicator_names.as_deref());
    if tickers.is_empty() || indicator_names.is_empty() {
        return ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "tickers and indicator_names are required".to_string(),
        }
        .into_response();
    }

    match state
        .indicators
        .batch_calculate_stream(&tickers, &indicator_names)
        .await
    {
        Ok(stream) => sse::event_stream_response(stream),
        Err(err) => ApiError::from(err).into_response(),
    }
}
