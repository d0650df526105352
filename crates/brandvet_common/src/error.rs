//! Error taxonomy for the validation engine.
//!
//! Tier-level failures never cross the provider boundary: every adapter
//! catches them and folds them into a `TierResult`. The only errors a
//! caller can observe are request/configuration faults detected before any
//! tier is dispatched, plus orchestrator bookkeeping failures.

use thiserror::Error;

/// Failure inside a single evidence tier.
///
/// Converted into a `TierResult` with status `Failed` or `TimedOut` at the
/// provider boundary; never propagated past it.
#[derive(Debug, Clone, Error)]
pub enum TierError {
    /// The tier exceeded its own deadline.
    #[error("tier timed out after {0}ms")]
    Timeout(u64),

    /// The provider answered with an error status (rate limit, auth, 5xx).
    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The provider response was malformed or unparseable.
    #[error("unparseable provider response: {0}")]
    Parse(String),

    /// Transport-level failure (connect, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),
}

impl TierError {
    /// Whether a single in-budget retry is worth attempting.
    ///
    /// Only transient transport failures qualify; API rejections and parse
    /// failures will not improve on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, TierError::Network(_))
    }
}

/// Engine-level error.
///
/// `InvalidRequest` and `Config` are the only variants a caller sees.
/// `DeadlineExceeded` is consumed by the orchestrator itself and turned
/// into `TimedOut` tier statuses. `Internal` signals a bookkeeping fault
/// (a panicked tier task), never an evidence failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed request, detected before any tier is invoked.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or inconsistent configuration, detected at engine build.
    #[error("configuration error: {0}")]
    Config(String),

    /// The global request deadline elapsed. Internal marker only.
    #[error("global validation deadline exceeded")]
    DeadlineExceeded,

    /// Orchestrator bookkeeping failure (never a provider failure).
    #[error("internal orchestration failure: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TierError::Network("connection reset".into()).is_transient());
        assert!(!TierError::Timeout(4000).is_transient());
        assert!(!TierError::Parse("bad json".into()).is_transient());
        assert!(!TierError::Api {
            status: 429,
            message: "rate limited".into()
        }
        .is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = TierError::Api {
            status: 401,
            message: "unauthorized".into(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("unauthorized"));
    }
}
