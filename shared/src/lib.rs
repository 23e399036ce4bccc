pub mod envelope;
pub mod metrics_defs;
pub mod pagination;
