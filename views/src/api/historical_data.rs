//! Historical OHLCV view handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway::historical_data::{DeleteCount, KlineBar, KlineQuery, SeriesStatistics, UpdateCounts};
use serde::{Deserialize, Serialize};
use shared::envelope::Envelope;
use shared::pagination::paginate;

use crate::AppState;
use crate::api::{page_selection, split_csv};
use crate::error::{ApiError, ApiResult};
use crate::sse;

const DEFAULT_PERIOD: &str = "1d";

#[derive(Debug, Default, Deserialize)]
pub struct KlineParams {
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// The flat answer shape, used when the caller sent no paging parameters.
#[derive(Debug, Serialize)]
pub struct FlatSeries {
    pub ticker: String,
    pub period: String,
    pub count: usize,
    pub data: Vec<KlineBar>,
}

/// Flat or paginated, depending on the caller's paging parameters. An
/// upstream failure yields the same shape, empty.
pub async fn kline(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<KlineParams>,
) -> Response {
    let selection = page_selection(params.page, params.page_size);
    let query = KlineQuery {
        period: params.period.clone(),
        start_date: params.start_date.clone(),
        end_date: params.end_date.clone(),
        // In paginated mode the BFF slices the full series itself.
        limit: if selection.is_some() { None } else { params.limit },
    };

    let data = match state.historical_data.kline_data(&ticker, &query).await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(%ticker, error = %err, "kline series unavailable");
            Vec::new()
        }
    };

    match selection {
        Some((page, page_size)) => Envelope::success(paginate(data, page, page_size)).into_response(),
        None => Envelope::success(FlatSeries {
            ticker,
            period: params.period.unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
            count: data.len(),
            data,
        })
        .into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsParams {
    pub period: Option<String>,
}

pub async fn statistics(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<StatisticsParams>,
) -> Envelope<SeriesStatistics> {
    match state
        .historical_data
        .statistics(&ticker, params.period.as_deref())
        .await
    {
        Ok(stats) => Envelope::success(stats),
        Err(err) => {
            tracing::warn!(%ticker, error = %err, "series statistics unavailable");
            Envelope::success(SeriesStatistics::default())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateParams {
    pub period: Option<String>,
    pub incremental: Option<bool>,
    pub data_source: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<UpdateParams>,
) -> ApiResult<Envelope<UpdateCounts>> {
    let counts = state
        .historical_data
        .update(
            &ticker,
            params.period.as_deref(),
            // A bare update is a full refetch; incremental is opt-in.
            params.incremental.unwrap_or(false),
            params.data_source.as_deref(),
        )
        .await?;
    Ok(Envelope::success(counts))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<KlineParams>,
) -> ApiResult<Envelope<DeleteCount>> {
    let query = KlineQuery {
        period: params.period,
        start_date: params.start_date,
        end_date: params.end_date,
        limit: None,
    };
    Ok(Envelope::success(
        state.historical_data.delete(&ticker, &query).await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchParams {
    pub tickers: Option<String>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl BatchParams {
    fn query(&self) -> KlineQuery {
        KlineQuery {
            period: self.period.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            limit: None,
        }
    }
}

/// Progress stream for a batch refresh. GET, because EventSource on the
/// frontend can only open GET streams.
pub async fn batch_update(
    State(state): State<AppState>,
    Query(params): Query<BatchParams>,
) -> Response {
    let tickers = split_csv(params.tickers.as_deref());
    if tickers.is_empty() {
        return ApiError {
            status: StatusCode::BAD_REQUEST,
            message: "tickers is required".to_string(),
        }
        .into_response();
    }

    match state
        .historical_data
        .batch_update_stream(&tickers, &params.query())
        .await
    {
        Ok(stream) => sse::event_stream_response(stream),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Progress stream for a refresh across the whole stock universe.
pub async fn full_update(
    State(state): State<AppState>,
    Query(params): Query<BatchParams>,
) -> Response {
    match state
        .historical_data
        .full_update_stream(&params.query())
        .await
    {
        Ok(stream) => sse::event_stream_response(stream),
        Err(err) => ApiError::from(err).into_response(),
    }
}
