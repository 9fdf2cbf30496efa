//! The quorum fan-out engine (spec.md §4.4): dispatches one concurrent
//! request per target replica and delivers replies to an aggregator in
//! arrival order, always draining every in-flight call before returning.

use std::net::SocketAddr;

use tokio::task::JoinSet;

use abd_wire::{Request, Response};

use crate::transport;

/// Outcome of one fan-out round.
pub struct FanOutResult<S> {
    /// Final accumulated aggregator state.
    pub state: S,
    /// Count of replies classified "successful" by the caller's predicate.
    pub successes: usize,
    /// Total replies observed, successful or not (always equal to the
    /// number of targets once the round completes).
    pub responses: usize,
}

/// Runs one fan-out round against `targets`.
///
/// `make_request(i)` builds the request sent to `targets[i]`.
/// `aggregate(state, i, reply)` folds each reply into the running state,
/// called once per target in arrival order. `is_success(reply)` decides
/// whether a reply counts toward the quorum threshold.
///
/// Per spec.md §4.4 item 4, every outstanding call is reaped before this
/// function returns — there is no early return on reaching a threshold.
pub async fn fan_out<S>(
    targets: &[SocketAddr],
    mut make_request: impl FnMut(usize) -> Request,
    initial: S,
    mut aggregate: impl FnMut(S, usize, &Response) -> S,
    is_success: impl Fn(&Response) -> bool,
) -> FanOutResult<S> {
    let mut set = JoinSet::new();
    for (idx, &addr) in targets.iter().enumerate() {
        let request = make_request(idx);
        set.spawn(async move { (idx, transport::call(addr, request).await) });
    }

    let mut state = initial;
    let mut successes = 0;
    let mut responses = 0;

    while let Some(joined) = set.join_next().await {
        responses += 1;
        match joined {
            Ok((idx, Ok(response))) => {
                if is_success(&response) {
                    successes += 1;
                }
                state = aggregate(state, idx, &response);
            }
            Ok((idx, Err(e))) => {
                tracing::debug!(idx, error = %e, "replica call failed");
            }
            Err(join_err) => {
                tracing::warn!(error = %join_err, "fan-out task panicked");
            }
        }
    }

    FanOutResult {
        state,
        successes,
        responses,
    }
}
