//! The dashboard aggregate.
//!
//! One request fans out to every upstream at once; whichever branches fail
//! contribute zeros or empty lists while the rest render normally. The
//! payload keys are camelCase, the contract the frontend already consumes.

use axum::extract::State;
use chrono::{DateTime, Utc};
use gateway::stock_info::{Stock, StockQuery};
use serde::Serialize;
use shared::envelope::Envelope;
use shared::pagination::Page;

use crate::AppState;
use crate::api::items::aggregate_catalogs;
use crate::fanout;
use crate::normalize::UnifiedRecord;

/// Market classes the frontend groups stocks by.
const MARKET_TYPES: [&str; 3] = ["A股", "美股", "港股"];

/// Stock sample pulled for the recent list and the update-time estimate.
const SAMPLE_PAGE_SIZE: usize = 100;
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: usize,
    pub python_items: usize,
    pub node_items: usize,
    pub rust_items: usize,
    pub total_stocks: usize,
    pub a_stock_count: usize,
    pub us_stock_count: usize,
    pub hk_stock_count: usize,
    pub provider_count: usize,
    /// Earliest creation time in the sampled stock page, a proxy for when
    /// the last full refresh ran. Omitted when the sample is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_full_update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_items: Vec<UnifiedRecord>,
    pub recent_stocks: Vec<Stock>,
}

pub async fn dashboard(State(state): State<AppState>) -> Envelope<Dashboard> {
    let sample_query = StockQuery {
        page: Some(1),
        page_size: Some(SAMPLE_PAGE_SIZE),
        ..StockQuery::default()
    };

    let (stock_page, providers, catalogs, (a_stock_count, us_stock_count, hk_stock_count)) = tokio::join!(
        fanout::settle(state.stock_info.stocks(&sample_query)),
        fanout::settle(state.stock_info.provider_status()),
        aggregate_catalogs(&state),
        market_counts(&state),
    );

    let stock_page = stock_page
        .into_option()
        .unwrap_or_else(|| Page::empty(1, SAMPLE_PAGE_SIZE));
    let providers = providers.into_option().unwrap_or_default();

    let last_full_update_time = stock_page.items.iter().filter_map(|s| s.created_at).min();

    let stats = DashboardStats {
        total_items: catalogs.records.len(),
        python_items: catalogs.python_count,
        node_items: catalogs.node_count,
        rust_items: catalogs.rust_count,
        total_stocks: stock_page.total,
        a_stock_count,
        us_stock_count,
        hk_stock_count,
        provider_count: providers.total_providers,
        last_full_update_time,
    };

    // "Recent" means most recently updated; stocks without a timestamp
    // sort last.
    let mut recent_stocks = stock_page.items;
    recent_stocks.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
    recent_stocks.truncate(RECENT_LIMIT);

    let mut recent_items = catalogs.records;
    recent_items.truncate(RECENT_LIMIT);

    Envelope::success(Dashboard {
        stats,
        recent_items,
        recent_stocks,
    })
}

/// Counts per market class via three single-row queries; only the page
/// totals are read. A failed count renders as zero.
async fn market_counts(state: &AppState) -> (usize, usize, usize) {
    let query = |market_type: &str| StockQuery {
        page: Some(1),
        page_size: Some(1),
        ..StockQuery::market_type(market_type)
    };

    let (a, us, hk) = fanout::settle3(
        state.stock_info.stocks(&query(MARKET_TYPES[0])),
        state.stock_info.stocks(&query(MARKET_TYPES[1])),
        state.stock_info.stocks(&query(MARKET_TYPES[2])),
    )
    .await;

    let total = |outcome: fanout::CallOutcome<Page<Stock>>| {
        outcome.into_option().map(|page| page.total).unwrap_or(0)
    };
    (total(a), total(us), total(hk))
}
