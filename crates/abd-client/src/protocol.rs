//! The two-phase PUT/GET algorithms (spec.md §4.5), parameterized over the
//! target replica set and success threshold so the blocking variant
//! (spec.md §4.6) can reuse them unchanged against a locked subset.

use std::net::SocketAddr;

use abd_types::Tag;
use abd_wire::{Request, RequestPayload, Response, ResponsePayload};

use crate::error::{ClientError, ClientResult};
use crate::quorum::fan_out;

fn is_write_query_ok(resp: &Response) -> bool {
    resp.is_ok() && matches!(resp.payload, Some(ResponsePayload::WriteQuery { .. }))
}

fn is_read_query_ok(resp: &Response) -> bool {
    resp.is_ok() && matches!(resp.payload, Some(ResponsePayload::ReadQuery { .. }))
}

fn is_write_prop_acked(resp: &Response) -> bool {
    resp.is_ok() && matches!(resp.payload, Some(ResponsePayload::WriteProp { ok: true, .. }))
}

/// Runs PUT's two phases against `targets`, requiring `threshold`
/// successes in each phase (spec.md §4.5).
pub async fn two_phase_put(
    targets: &[SocketAddr],
    writer_id: &str,
    key: &str,
    value: &str,
    threshold: usize,
) -> ClientResult<()> {
    let phase1 = fan_out(
        targets,
        |_| {
            Request::new(RequestPayload::WriteQuery {
                key: key.to_string(),
            })
        },
        Tag::min(),
        |max_tag, _idx, resp| match &resp.payload {
            Some(ResponsePayload::WriteQuery { tag }) if *tag > max_tag => tag.clone(),
            _ => max_tag,
        },
        is_write_query_ok,
    )
    .await;

    if phase1.successes < threshold {
        return Err(ClientError::QuorumUnreached {
            phase: "write_query",
            need: threshold,
            got: phase1.successes,
        });
    }

    let new_tag = phase1.state.next(writer_id);

    let phase2 = fan_out(
        targets,
        |_| {
            Request::new(RequestPayload::WriteProp {
                key: key.to_string(),
                tag: new_tag.clone(),
                value: value.to_string(),
            })
        },
        (),
        |(), _idx, _resp| (),
        is_write_prop_acked,
    )
    .await;

    if phase2.successes < threshold {
        return Err(ClientError::QuorumUnreached {
            phase: "write_prop",
            need: threshold,
            got: phase2.successes,
        });
    }

    Ok(())
}

/// Runs GET's two phases (read quorum + write-back) against `targets`,
/// requiring `threshold` successes in each phase (spec.md §4.5).
pub async fn two_phase_get(
    targets: &[SocketAddr],
    key: &str,
    threshold: usize,
) -> ClientResult<String> {
    let phase1 = fan_out(
        targets,
        |_| {
            Request::new(RequestPayload::ReadQuery {
                key: key.to_string(),
            })
        },
        (Tag::min(), String::new()),
        |(max_tag, max_value), _idx, resp| match &resp.payload {
            Some(ResponsePayload::ReadQuery { tag, value }) if *tag > max_tag => {
                (tag.clone(), value.clone())
            }
            _ => (max_tag, max_value),
        },
        is_read_query_ok,
    )
    .await;

    // successes < threshold subsumes the "no successful reply" case
    // from spec.md §4.5 step 2, since threshold is always >= 1.
    if phase1.successes < threshold {
        return Err(ClientError::QuorumUnreached {
            phase: "read_query",
            need: threshold,
            got: phase1.successes,
        });
    }

    let (max_tag, max_value) = phase1.state;

    let phase2 = fan_out(
        targets,
        |_| {
            Request::new(RequestPayload::WriteProp {
                key: key.to_string(),
                tag: max_tag.clone(),
                value: max_value.clone(),
            })
        },
        (),
        |(), _idx, _resp| (),
        is_write_prop_acked,
    )
    .await;

    if phase2.successes < threshold {
        return Err(ClientError::QuorumUnreached {
            phase: "write_prop",
            need: threshold,
            got: phase2.successes,
        });
    }

    Ok(max_value)
}
