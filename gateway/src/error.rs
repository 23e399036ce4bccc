use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Failure taxonomy for upstream calls.
///
/// Classification happens in priority order: transport timeout, then
/// connectivity, then non-2xx HTTP status, then everything else. The variant
/// decides which HTTP status the BFF attaches when the failure is propagated.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("upstream {upstream} timed out during {operation}")]
    Timeout {
        upstream: &'static str,
        operation: String,
    },

    #[error("upstream {upstream} is unreachable: {message}")]
    Unavailable {
        upstream: &'static str,
        message: String,
    },

    #[error("upstream {upstream} rejected {operation} with status {status}: {message}")]
    Rejected {
        upstream: &'static str,
        operation: String,
        status: u16,
        message: String,
    },

    #[error("upstream {upstream} call {operation} failed: {message}")]
    Unknown {
        upstream: &'static str,
        operation: String,
        message: String,
    },
}

/// The shape of a failure, without its payload. Carried by settled fan-out
/// branches so callers can inspect what went wrong without owning the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Unavailable,
    Rejected(u16),
    Unknown,
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Timeout { .. } => FailureKind::Timeout,
            GatewayError::Unavailable { .. } => FailureKind::Unavailable,
            GatewayError::Rejected { status, .. } => FailureKind::Rejected(*status),
            GatewayError::Unknown { .. } => FailureKind::Unknown,
        }
    }

    pub fn upstream(&self) -> &'static str {
        match self {
            GatewayError::Timeout { upstream, .. }
            | GatewayError::Unavailable { upstream, .. }
            | GatewayError::Rejected { upstream, .. }
            | GatewayError::Unknown { upstream, .. } => upstream,
        }
    }
}

/// Maps a transport-level reqwest failure onto the taxonomy. Rejections are
/// produced separately, after the status of a delivered response is known.
pub(crate) fn classify_transport(
    upstream: &'static str,
    operation: &str,
    err: reqwest::Error,
) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout {
            upstream,
            operation: operation.to_string(),
        }
    } else if err.is_connect() {
        GatewayError::Unavailable {
            upstream,
            message: err.to_string(),
        }
    } else {
        GatewayError::Unknown {
            upstream,
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }
}
