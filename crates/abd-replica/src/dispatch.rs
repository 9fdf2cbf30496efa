//! Routes inbound requests to the replica's register store and lock table
//! (spec.md §4.7). Stateless beyond the store it wraps.

use abd_store::ReplicaState;
use abd_wire::{Request, RequestPayload, Response, ResponsePayload};
use tracing::instrument;

/// Dispatches requests onto a shared [`ReplicaState`].
///
/// No request ordering is guaranteed across different keys; within a
/// single key, [`ReplicaState`]'s internal mutex serializes all
/// operations (spec.md §4.7).
pub struct Dispatcher {
    state: ReplicaState,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: ReplicaState::new(),
        }
    }

    /// Handles one request and produces its reply. Per spec.md §7, the
    /// replica never fails an operation logically — every call returns a
    /// structured reply with transport [`abd_wire::Status::Ok`].
    #[instrument(skip_all, fields(op))]
    pub fn dispatch(&self, request: Request) -> Response {
        match request.payload {
            RequestPayload::WriteQuery { key } => {
                tracing::Span::current().record("op", "write_query");
                let tag = self.state.write_query(&key);
                Response::ok(ResponsePayload::WriteQuery { tag })
            }
            RequestPayload::ReadQuery { key } => {
                tracing::Span::current().record("op", "read_query");
                let entry = self.state.read_query(&key);
                Response::ok(ResponsePayload::ReadQuery {
                    tag: entry.tag,
                    value: entry.value,
                })
            }
            RequestPayload::WriteProp { key, tag, value } => {
                tracing::Span::current().record("op", "write_prop");
                self.state.write_prop(&key, tag, value);
                Response::ok(ResponsePayload::WriteProp {
                    ok: true,
                    error: String::new(),
                })
            }
            RequestPayload::AcquireLock { key, client_id } => {
                tracing::Span::current().record("op", "acquire_lock");
                let grant = self.state.acquire_lock(&key, &client_id);
                Response::ok(ResponsePayload::AcquireLock {
                    granted: grant.granted,
                    holder: grant.holder,
                })
            }
            RequestPayload::ReleaseLock { key, client_id } => {
                tracing::Span::current().record("op", "release_lock");
                let ok = self.state.release_lock(&key, &client_id);
                Response::ok(ResponsePayload::ReleaseLock { ok })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abd_types::Tag;

    #[test]
    fn write_query_on_absent_key_returns_min_tag() {
        let d = Dispatcher::new();
        let resp = d.dispatch(Request::new(RequestPayload::WriteQuery {
            key: "k".to_string(),
        }));
        assert!(resp.is_ok());
        match resp.payload {
            Some(ResponsePayload::WriteQuery { tag }) => assert_eq!(tag, Tag::min()),
            _ => panic!("expected WriteQuery payload"),
        }
    }

    #[test]
    fn write_prop_then_read_query_round_trips() {
        let d = Dispatcher::new();
        let ack = d.dispatch(Request::new(RequestPayload::WriteProp {
            key: "k".to_string(),
            tag: Tag::new(1, "c1"),
            value: "v".to_string(),
        }));
        match ack.payload {
            Some(ResponsePayload::WriteProp { ok, .. }) => assert!(ok),
            _ => panic!("expected WriteProp ack"),
        }

        let resp = d.dispatch(Request::new(RequestPayload::ReadQuery {
            key: "k".to_string(),
        }));
        match resp.payload {
            Some(ResponsePayload::ReadQuery { tag, value }) => {
                assert_eq!(tag, Tag::new(1, "c1"));
                assert_eq!(value, "v");
            }
            _ => panic!("expected ReadQuery payload"),
        }
    }

    #[test]
    fn write_prop_always_acks_ok_even_when_tag_rejected() {
        let d = Dispatcher::new();
        d.dispatch(Request::new(RequestPayload::WriteProp {
            key: "k".to_string(),
            tag: Tag::new(5, "x"),
            value: "first".to_string(),
        }));
        // A stale tag is ignored by the merge rule but still acked ok=true.
        let ack = d.dispatch(Request::new(RequestPayload::WriteProp {
            key: "k".to_string(),
            tag: Tag::new(2, "y"),
            value: "stale".to_string(),
        }));
        match ack.payload {
            Some(ResponsePayload::WriteProp { ok, .. }) => assert!(ok),
            _ => panic!("expected WriteProp ack"),
        }
        let resp = d.dispatch(Request::new(RequestPayload::ReadQuery {
            key: "k".to_string(),
        }));
        match resp.payload {
            Some(ResponsePayload::ReadQuery { value, .. }) => assert_eq!(value, "first"),
            _ => panic!("expected ReadQuery payload"),
        }
    }

    #[test]
    fn acquire_then_release_then_reacquire_by_other_client() {
        let d = Dispatcher::new();
        let grant = d.dispatch(Request::new(RequestPayload::AcquireLock {
            key: "k".to_string(),
            client_id: "1".to_string(),
        }));
        match grant.payload {
            Some(ResponsePayload::AcquireLock { granted, holder }) => {
                assert!(granted);
                assert_eq!(holder, "1");
            }
            _ => panic!("expected AcquireLock payload"),
        }

        // Release by non-holder fails.
        let release = d.dispatch(Request::new(RequestPayload::ReleaseLock {
            key: "k".to_string(),
            client_id: "2".to_string(),
        }));
        match release.payload {
            Some(ResponsePayload::ReleaseLock { ok }) => assert!(!ok),
            _ => panic!("expected ReleaseLock payload"),
        }

        // Release by holder succeeds.
        let release = d.dispatch(Request::new(RequestPayload::ReleaseLock {
            key: "k".to_string(),
            client_id: "1".to_string(),
        }));
        match release.payload {
            Some(ResponsePayload::ReleaseLock { ok }) => assert!(ok),
            _ => panic!("expected ReleaseLock payload"),
        }

        let grant = d.dispatch(Request::new(RequestPayload::AcquireLock {
            key: "k".to_string(),
            client_id: "2".to_string(),
        }));
        match grant.payload {
            Some(ResponsePayload::AcquireLock { granted, holder }) => {
                assert!(granted);
                assert_eq!(holder, "2");
            }
            _ => panic!("expected AcquireLock payload"),
        }
    }
}
