//! The merged catalog view.

use axum::extract::State;
use shared::envelope::Envelope;

use crate::AppState;
use crate::fanout;
use crate::normalize::{self, UnifiedRecord};

/// All three catalogs, merged, deduped and sorted. A dead catalog simply
/// contributes nothing.
pub async fn items(State(state): State<AppState>) -> Envelope<Vec<UnifiedRecord>> {
    Envelope::success(aggregate_catalogs(&state).await.records)
}

/// Merged catalog records plus the per-source raw counts, taken before
/// deduplication.
pub(crate) struct CatalogAggregate {
    pub records: Vec<UnifiedRecord>,
    pub python_count: usize,
    pub node_count: usize,
    pub rust_count: usize,
}

pub(crate) async fn aggregate_catalogs(state: &AppState) -> CatalogAggregate {
    let (python, node, rust) = fanout::settle3(
        state.catalog_python.items(),
        state.catalog_node.items(),
        state.catalog_rust.items(),
    )
    .await;

    let mut records = Vec::new();
    let mut counts = [0usize; 3];
    for (slot, batch) in counts.iter_mut().zip([python, node, rust]) {
        if let Some(batch) = batch.into_option() {
            let unified = normalize::unify_batch(batch);
            *slot = unified.len();
            records.extend(unified);
        }
    }

    CatalogAggregate {
        records: normalize::merge_dedup(records),
        python_count: counts[0],
        node_count: counts[1],
        rust_count: counts[2],
    }
}
