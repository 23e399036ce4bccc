//! Clients for the three item-catalog upstreams.
//!
//! The catalogs expose the same logical records in three different JSON
//! dialects. Each dialect gets its own typed record; the normalizer in the
//! views crate maps every variant into the unified record shape before any
//! merge or sort logic runs.

use crate::client::UpstreamClient;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Which catalog upstream a record came from. Ordering doubles as the
/// deterministic tie-break priority when merged records share an updated
/// timestamp (lowest wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Python,
    Node,
    Rust,
}

impl CatalogSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CatalogSource::Python => "python",
            CatalogSource::Node => "node",
            CatalogSource::Rust => "rust",
        }
    }

    pub const fn priority(&self) -> u8 {
        match self {
            CatalogSource::Python => 0,
            CatalogSource::Node => 1,
            CatalogSource::Rust => 2,
        }
    }
}

/// Record shape of the Python catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct PythonItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record shape of the Node catalog service (Mongo-flavored field names).
#[derive(Debug, Clone, Deserialize)]
pub struct NodeItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Record shape of the Rust catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct RustItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One upstream's worth of catalog records, still in its native shape.
#[derive(Debug, Clone)]
pub enum CatalogBatch {
    Python(Vec<PythonItem>),
    Node(Vec<NodeItem>),
    Rust(Vec<RustItem>),
}

#[derive(Clone)]
pub struct CatalogClient {
    source: CatalogSource,
    inner: UpstreamClient,
}

impl CatalogClient {
    pub fn new(source: CatalogSource, base_url: Url, timeout: Duration) -> Self {
        let name = match source {
            CatalogSource::Python => "catalog-python",
            CatalogSource::Node => "catalog-node",
            CatalogSource::Rust => "catalog-rust",
        };
        CatalogClient {
            source,
            inner: UpstreamClient::new(name, base_url, timeout),
        }
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub async fn items(&self) -> Result<CatalogBatch> {
        Ok(match self.source {
            CatalogSource::Python => {
                CatalogBatch::Python(self.inner.get_json("items", &[]).await?.unwrap_or_default())
            }
            CatalogSource::Node => {
                CatalogBatch::Node(self.inner.get_json("items", &[]).await?.unwrap_or_default())
            }
            CatalogSource::Rust => {
                CatalogBatch::Rust(self.inner.get_json("items", &[]).await?.unwrap_or_default())
            }
        })
    }
}
