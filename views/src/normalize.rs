//! Cross-source record normalization.
//!
//! Every catalog upstream speaks its own JSON dialect; each dialect is mapped
//! through an explicit transform into [`UnifiedRecord`] before any merge or
//! sort logic runs. Nothing downstream of this module ever sees a native
//! upstream shape.

use chrono::{DateTime, Utc};
use gateway::catalog::{CatalogBatch, CatalogSource, NodeItem, PythonItem, RustItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The single record shape the frontend consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub source: CatalogSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PythonItem> for UnifiedRecord {
    fn from(item: PythonItem) -> Self {
        UnifiedRecord {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price,
            source: CatalogSource::Python,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<NodeItem> for UnifiedRecord {
    fn from(item: NodeItem) -> Self {
        UnifiedRecord {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price,
            source: CatalogSource::Node,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<RustItem> for UnifiedRecord {
    fn from(item: RustItem) -> Self {
        UnifiedRecord {
            id: item.id,
            name: item.name,
            description: item.description,
            price: item.price,
            source: CatalogSource::Rust,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Maps one upstream batch into unified records.
pub fn unify_batch(batch: CatalogBatch) -> Vec<UnifiedRecord> {
    match batch {
        CatalogBatch::Python(items) => items.into_iter().map(UnifiedRecord::from).collect(),
        CatalogBatch::Node(items) => items.into_iter().map(UnifiedRecord::from).collect(),
        CatalogBatch::Rust(items) => items.into_iter().map(UnifiedRecord::from).collect(),
    }
}

/// Deduplicates by name and sorts by `updated_at` descending.
///
/// On a name collision the record with the later `updated_at` survives. When
/// timestamps are exactly equal, the record from the higher-priority source
/// wins (python over node over rust); within one source the first-encountered
/// record is kept. The result order is fully deterministic regardless of the
/// order branches completed in.
pub fn merge_dedup(records: Vec<UnifiedRecord>) -> Vec<UnifiedRecord> {
    let mut by_name: HashMap<String, UnifiedRecord> = HashMap::new();

    for record in records {
        match by_name.get(&record.name) {
            Some(incumbent) if !replaces(&record, incumbent) => {}
            _ => {
                by_name.insert(record.name.clone(), record);
            }
        }
    }

    let mut merged: Vec<UnifiedRecord> = by_name.into_values().collect();
    merged.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.source.priority().cmp(&b.source.priority()))
            .then_with(|| a.name.cmp(&b.name))
    });
    merged
}

fn replaces(candidate: &UnifiedRecord, incumbent: &UnifiedRecord) -> bool {
    match candidate.updated_at.cmp(&incumbent.updated_at) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => candidate.source.priority() < incumbent.source.priority(),
        std::cmp::Ordering::Less => false,
    }
}
