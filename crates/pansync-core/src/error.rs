// ── Core error types ──
//
// Failures from the reconciliation engine. Caller-input problems
// (unknown operation, bad mode or next-hop tokens) are not errors at
// all; they surface as unchanged outcomes. These variants cover
// identifier validation and device failures, tagged with the phase
// that hit them. The device's own message travels in the source chain.

use thiserror::Error;

use crate::reconcile::ResourceKind;

/// Unified error type for the reconciliation engine.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ───────────────────────────────────────────────────
    /// An identifier that cannot be embedded in an XPath predicate.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: String,
    },

    // ── Device phases ────────────────────────────────────────────────
    /// The existence probe failed. Errors never count as absence.
    #[error("probe failed at {xpath}")]
    ProbeFailed {
        xpath: String,
        #[source]
        source: pansync_xapi::Error,
    },

    /// A mutation step failed. Earlier steps are not rolled back.
    #[error("{kind} mutation failed at {xpath}")]
    MutationFailed {
        kind: ResourceKind,
        xpath: String,
        #[source]
        source: pansync_xapi::Error,
    },

    /// The post-mutation commit failed or did not converge.
    #[error("commit failed")]
    CommitFailed {
        #[source]
        source: pansync_xapi::Error,
    },
}

impl CoreError {
    /// The underlying session error, when this error wraps one.
    pub fn session_error(&self) -> Option<&pansync_xapi::Error> {
        match self {
            Self::ProbeFailed { source, .. }
            | Self::MutationFailed { source, .. }
            | Self::CommitFailed { source } => Some(source),
            Self::InvalidName { .. } => None,
        }
    }
}
