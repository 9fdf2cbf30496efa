//! The blocking client protocol (spec.md §4.6): per-key quorum locks
//! acquired before each two-phase operation, restricting PUT/GET fan-out
//! to the locked subset.

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, warn};

use abd_wire::{Request, RequestPayload, ResponsePayload};

use crate::error::ClientResult;
use crate::protocol::{two_phase_get, two_phase_put};
use crate::quorum::fan_out;
use crate::session::Session;

/// Backoff between `AcquireLock` rounds, mirroring
/// `BlockingClient_async.cpp`'s fixed inter-round sleep.
const ACQUIRE_BACKOFF: Duration = Duration::from_millis(5);

/// Repeats `AcquireLock` rounds against not-yet-granted replicas until
/// exactly `q` distinct replica indices (into `replicas`) have granted
/// the lock. Never returns early and never times out by default
/// (spec.md §4.6) — a caller wanting a bound must wrap this call.
///
/// A round may grant more than the remaining need if several replicas
/// race to respond; any surplus grants are released immediately so the
/// returned set has exactly `q` members, matching the "restrict fan-out
/// to the locked subset, `|T| = q`" requirement the locked two-phase
/// calls depend on.
pub async fn acquire_quorum_locks(
    replicas: &[SocketAddr],
    client_id: &str,
    key: &str,
    q: usize,
) -> Vec<usize> {
    let mut granted: Vec<usize> = Vec::new();

    loop {
        let pending: Vec<usize> = (0..replicas.len())
            .filter(|i| !granted.contains(i))
            .collect();
        let pending_addrs: Vec<SocketAddr> = pending.iter().map(|&i| replicas[i]).collect();

        let result = fan_out(
            &pending_addrs,
            |_local_idx| {
                Request::new(RequestPayload::AcquireLock {
                    key: key.to_string(),
                    client_id: client_id.to_string(),
                })
            },
            Vec::new(),
            |mut acc: Vec<usize>, local_idx, resp| {
                if let Some(ResponsePayload::AcquireLock { granted: true, .. }) = &resp.payload {
                    acc.push(pending[local_idx]);
                }
                acc
            },
            |resp| {
                resp.is_ok()
                    && matches!(
                        resp.payload,
                        Some(ResponsePayload::AcquireLock { granted: true, .. })
                    )
            },
        )
        .await;

        granted.extend(result.state);

        if granted.len() >= q {
            granted.sort_unstable();
            if granted.len() > q {
                let surplus = granted.split_off(q);
                release_locks(replicas, client_id, key, &surplus).await;
            }
            return granted;
        }

        debug!(
            key,
            acquired = granted.len(),
            needed = q,
            "lock acquisition round incomplete, backing off"
        );
        tokio::time::sleep(ACQUIRE_BACKOFF).await;
    }
}

/// Releases the lock on `key` at every replica index in `granted`.
/// Failures are logged, never surfaced (spec.md §4.6, §7).
pub async fn release_locks(replicas: &[SocketAddr], client_id: &str, key: &str, granted: &[usize]) {
    if granted.is_empty() {
        return;
    }

    let targets: Vec<SocketAddr> = granted.iter().map(|&i| replicas[i]).collect();
    let result = fan_out(
        &targets,
        |_| {
            Request::new(RequestPayload::ReleaseLock {
                key: key.to_string(),
                client_id: client_id.to_string(),
            })
        },
        (),
        |(), _idx, _resp| (),
        |resp| resp.is_ok() && matches!(resp.payload, Some(ResponsePayload::ReleaseLock { ok: true })),
    )
    .await;

    if result.successes < targets.len() {
        warn!(
            key,
            acquired = targets.len(),
            released = result.successes,
            "some lock releases failed or were rejected; stale holder persists until retried"
        );
    }
}

/// Blocking PUT (spec.md §4.6): acquires `W` locks, runs PUT restricted
/// to that subset, then releases regardless of outcome.
pub async fn put_blocking(session: &Session, key: &str, value: &str) -> ClientResult<()> {
    let w = session.quorum();
    let granted = acquire_quorum_locks(session.replicas(), session.writer_id(), key, w).await;
    let targets: Vec<SocketAddr> = granted.iter().map(|&i| session.replicas()[i]).collect();

    let result = two_phase_put(&targets, session.writer_id(), key, value, w).await;
    release_locks(session.replicas(), session.writer_id(), key, &granted).await;
    result
}

/// Blocking GET (spec.md §4.6): acquires `R` locks, runs GET restricted
/// to that subset, then releases regardless of outcome.
pub async fn get_blocking(session: &Session, key: &str) -> ClientResult<String> {
    let r = session.quorum();
    let granted = acquire_quorum_locks(session.replicas(), session.writer_id(), key, r).await;
    let targets: Vec<SocketAddr> = granted.iter().map(|&i| session.replicas()[i]).collect();

    let result = two_phase_get(&targets, key, r).await;
    release_locks(session.replicas(), session.writer_id(), key, &granted).await;
    result
}
