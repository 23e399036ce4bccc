//! Metrics definitions for the aggregation engine.

use shared::metrics_defs::{MetricDef, MetricType};

pub const FANOUT_BRANCH_FAILURE: MetricDef = MetricDef {
    name: "fanout.branch_failure",
    metric_type: MetricType::Counter,
    description: "Fan-out branches that settled as failures",
};

pub const SSE_SESSIONS_OPENED: MetricDef = MetricDef {
    name: "sse.sessions_opened",
    metric_type: MetricType::Counter,
    description: "Streaming proxy sessions opened towards a downstream client",
};

pub const SSE_UPSTREAM_ERRORS: MetricDef = MetricDef {
    name: "sse.upstream_errors",
    metric_type: MetricType::Counter,
    description: "Streaming sessions terminated by a mid-stream upstream error",
};

pub const ALL_METRICS: &[MetricDef] = &[
    FANOUT_BRANCH_FAILURE,
    SSE_SESSIONS_OPENED,
    SSE_UPSTREAM_ERRORS,
];
