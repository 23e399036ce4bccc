//! Partial-failure-tolerant fan-out.
//!
//! Aggregate endpoints issue several independent upstream calls at once and
//! want every branch to settle, success or failure, before anything is
//! observable. A failed branch never aborts its siblings and never raises;
//! callers check each outcome explicitly.

use crate::metrics_defs;
use gateway::error::{FailureKind, GatewayError};

/// Settled result of one fan-out branch. A branch is exactly one of the two
/// variants, never partially filled.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    Failure { kind: FailureKind, message: String },
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CallOutcome::Success(value) => Some(value),
            CallOutcome::Failure { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            CallOutcome::Success(_) => None,
            CallOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Settles one branch: failures are absorbed into an outcome, logged, and
/// counted; they are never re-raised.
pub async fn settle<T>(branch: impl Future<Output = Result<T, GatewayError>>) -> CallOutcome<T> {
    match branch.await {
        Ok(value) => CallOutcome::Success(value),
        Err(err) => {
            tracing::warn!(upstream = err.upstream(), error = %err, "fan-out branch failed");
            metrics::counter!(metrics_defs::FANOUT_BRANCH_FAILURE.name).increment(1);
            CallOutcome::Failure {
                kind: err.kind(),
                message: err.to_string(),
            }
        }
    }
}

/// Runs two branches concurrently; position in the output always matches
/// position in the input, whatever the completion order.
pub async fn settle2<A, B>(
    a: impl Future<Output = Result<A, GatewayError>>,
    b: impl Future<Output = Result<B, GatewayError>>,
) -> (CallOutcome<A>, CallOutcome<B>) {
    tokio::join!(settle(a), settle(b))
}

pub async fn settle3<A, B, C>(
    a: impl Future<Output = Result<A, GatewayError>>,
    b: impl Future<Output = Result<B, GatewayError>>,
    c: impl Future<Output = Result<C, GatewayError>>,
) -> (CallOutcome<A>, CallOutcome<B>, CallOutcome<C>) {
    tokio::join!(settle(a), settle(b), settle(c))
}

pub async fn settle4<A, B, C, D>(
    a: impl Future<Output = Result<A, GatewayError>>,
    b: impl Future<Output = Result<B, GatewayError>>,
    c: impl Future<Output = Result<C, GatewayError>>,
    d: impl Future<Output = Result<D, GatewayError>>,
) -> (
    CallOutcome<A>,
    CallOutcome<B>,
    CallOutcome<C>,
    CallOutcome<D>,
) {
    tokio::join!(settle(a), settle(b), settle(c), settle(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    async fn delayed_ok<T>(value: T, delay_ms: u64) -> Result<T, GatewayError> {
        sleep(Duration::from_millis(delay_ms)).await;
        Ok(value)
    }

    async fn delayed_err<T>(delay_ms: u64) -> Result<T, GatewayError> {
        sleep(Duration::from_millis(delay_ms)).await;
        Err(GatewayError::Timeout {
            upstream: "test-upstream",
            operation: "read".to_string(),
        })
    }

    #[tokio::test]
    async fn outcome_order_matches_input_order_not_completion_order() {
        // The first branch finishes last; positions must still line up.
        let (a, b, c) = settle3(
            delayed_ok("first", 60),
            delayed_ok("second", 10),
            delayed_ok("third", 30),
        )
        .await;

        assert_eq!(a.into_option(), Some("first"));
        assert_eq!(b.into_option(), Some("second"));
        assert_eq!(c.into_option(), Some("third"));
    }

    #[tokio::test]
    async fn one_failing_branch_does_not_disturb_the_others() {
        let (a, b, c) = settle3(
            delayed_ok(1u32, 10),
            delayed_err::<u32>(5),
            delayed_ok(3u32, 20),
        )
        .await;

        assert_eq!(a.into_option(), Some(1));
        assert_eq!(b.kind(), Some(FailureKind::Timeout));
        assert_eq!(c.into_option(), Some(3));
    }

    #[tokio::test]
    async fn heterogeneous_branches_settle_together() {
        let (page, status) = settle2(delayed_ok(vec![1, 2], 5), delayed_ok("ready", 15)).await;

        assert_eq!(page.into_option(), Some(vec![1, 2]));
        assert_eq!(status.into_option(), Some("ready"));
    }

    #[tokio::test]
    async fn failure_carries_kind_and_message() {
        let outcome = settle(async {
            Err::<(), _>(GatewayError::Rejected {
                upstream: "stock-info",
                operation: "stocks".to_string(),
                status: 502,
                message: "bad gateway".to_string(),
            })
        })
        .await;

        match outcome {
            CallOutcome::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::Rejected(502));
                assert!(message.contains("bad gateway"));
            }
            CallOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
