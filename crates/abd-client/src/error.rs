//! Client-side error types.

use abd_wire::WireError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors a client protocol call can fail with (spec.md §7).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Fewer than the required number of successful replies landed in one
    /// phase of the two-phase protocol.
    #[error("quorum unreached in {phase}: needed {need}, got {got}")]
    QuorumUnreached {
        phase: &'static str,
        need: usize,
        got: usize,
    },

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// Only raised when a caller opts into a bounded acquire loop; the
    /// default `AcquireQuorumLocks` loop is unbounded (spec.md §4.6).
    #[error("timed out waiting to acquire quorum locks")]
    LockTimeout,
}
