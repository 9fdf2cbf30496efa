//! Binary wire protocol for the ABD replicated register.
//!
//! Every request and response is a `postcard`-encoded envelope prefixed by
//! a 4-byte big-endian length header ([`FRAME_HEADER_SIZE`]). This is the
//! concrete instance of the "generic unary RPC substrate" the core
//! protocol crates (`abd-store`, `abd-client`) are written against; they
//! never see a byte buffer directly.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use abd_types::Tag;

/// Size in bytes of the length header prefixing every frame.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Maximum permitted frame payload size (16 MiB). Guards against a
/// malformed or hostile length header causing unbounded buffering.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Errors from encoding or decoding the wire protocol.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("frame payload too large: {0} bytes (max {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("failed to encode payload: {0}")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode payload: {0}")]
    Decode(#[source] postcard::Error),
}

/// A length-prefixed, opaque wire frame.
///
/// [`Frame::decode`] consumes complete frames from a growing read buffer,
/// leaving any trailing partial frame in place for the next read.
#[derive(Debug, Clone)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Attempts to decode one complete frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` if `buf` does not yet contain a full frame (the
    /// caller should read more bytes from the socket and retry). Consumed
    /// bytes are removed from `buf`.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Frame>, WireError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let len = u32::from_be_bytes(buf[..FRAME_HEADER_SIZE].try_into().expect("4 bytes")) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(WireError::FrameTooLarge(len));
        }

        if buf.len() < FRAME_HEADER_SIZE + len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(len).freeze();
        Ok(Some(Frame { payload }))
    }

    /// Appends this frame's header and payload to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.payload.len() as u32);
        buf.put_slice(&self.payload);
    }

    fn from_payload<T: Serialize>(value: &T) -> Result<Self, WireError> {
        let bytes = postcard::to_allocvec(value).map_err(WireError::Encode)?;
        Ok(Frame {
            payload: Bytes::from(bytes),
        })
    }

    fn into_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, WireError> {
        postcard::from_bytes(&self.payload).map_err(WireError::Decode)
    }
}

/// The body of an inbound request, one variant per RPC operation in
/// spec.md §6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPayload {
    WriteQuery {
        key: String,
    },
    ReadQuery {
        key: String,
    },
    WriteProp {
        key: String,
        tag: Tag,
        value: String,
    },
    AcquireLock {
        key: String,
        client_id: String,
    },
    ReleaseLock {
        key: String,
        client_id: String,
    },
}

/// A complete inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub payload: RequestPayload,
}

impl Request {
    pub fn new(payload: RequestPayload) -> Self {
        Self { payload }
    }

    pub fn to_frame(&self) -> Result<Frame, WireError> {
        Frame::from_payload(self)
    }

    pub fn from_frame(frame: &Frame) -> Result<Self, WireError> {
        frame.into_payload()
    }
}

/// Transport-layer status, distinct from any logical `ok` carried inside
/// a response payload (spec.md §6). The replica never returns `Error`
/// during normal operation — WriteQuery/ReadQuery/WriteProp/AcquireLock/
/// ReleaseLock all always succeed logically, per spec.md §4.2–§4.3.
/// `Error` exists for protocol-level failures (e.g. an unrecognized
/// request shape reaching a future protocol version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Error(String),
}

/// The body of a reply, one variant per RPC operation in spec.md §6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePayload {
    WriteQuery {
        tag: Tag,
    },
    ReadQuery {
        tag: Tag,
        value: String,
    },
    WriteProp {
        ok: bool,
        error: String,
    },
    AcquireLock {
        granted: bool,
        holder: String,
    },
    ReleaseLock {
        ok: bool,
    },
}

/// A complete reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub payload: Option<ResponsePayload>,
}

impl Response {
    pub fn ok(payload: ResponsePayload) -> Self {
        Self {
            status: Status::Ok,
            payload: Some(payload),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error(message.into()),
            payload: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, Status::Ok)
    }

    pub fn to_frame(&self) -> Result<Frame, WireError> {
        Frame::from_payload(self)
    }

    pub fn from_frame(frame: &Frame) -> Result<Self, WireError> {
        frame.into_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_request(payload: RequestPayload) {
        let req = Request::new(payload);
        let frame = req.to_frame().unwrap();

        let mut buf = BytesMut::new();
        frame.encode(&mut buf);

        let decoded_frame = Frame::decode(&mut buf).unwrap().expect("complete frame");
        assert!(buf.is_empty(), "frame fully consumed");

        let decoded = Request::from_frame(&decoded_frame).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn write_query_roundtrips() {
        roundtrip_request(RequestPayload::WriteQuery {
            key: "k".to_string(),
        });
    }

    #[test]
    fn write_prop_roundtrips() {
        roundtrip_request(RequestPayload::WriteProp {
            key: "k".to_string(),
            tag: Tag::new(1, "w"),
            value: "v".to_string(),
        });
    }

    #[test]
    fn acquire_lock_roundtrips() {
        roundtrip_request(RequestPayload::AcquireLock {
            key: "k".to_string(),
            client_id: "c1".to_string(),
        });
    }

    #[test]
    fn decode_returns_none_on_partial_frame() {
        let req = Request::new(RequestPayload::ReadQuery {
            key: "k".to_string(),
        });
        let frame = req.to_frame().unwrap();
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);

        // Drop the last byte: an incomplete frame must not decode.
        let mut partial = buf.split_to(buf.len() - 1);
        assert!(Frame::decode(&mut partial).unwrap().is_none());
    }

    #[test]
    fn decode_rejects_oversized_length_header() {
        let mut buf = BytesMut::new();
        buf.put_u32((MAX_FRAME_SIZE + 1) as u32);
        let err = Frame::decode(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::FrameTooLarge(_)));
    }

    #[test]
    fn two_frames_in_one_buffer_decode_in_order() {
        let a = Request::new(RequestPayload::WriteQuery {
            key: "a".to_string(),
        });
        let b = Request::new(RequestPayload::WriteQuery {
            key: "b".to_string(),
        });

        let mut buf = BytesMut::new();
        a.to_frame().unwrap().encode(&mut buf);
        b.to_frame().unwrap().encode(&mut buf);

        let first = Frame::decode(&mut buf).unwrap().unwrap();
        let second = Frame::decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());

        assert_eq!(Request::from_frame(&first).unwrap(), a);
        assert_eq!(Request::from_frame(&second).unwrap(), b);
    }

    #[test]
    fn response_status_distinct_from_logical_ok() {
        // WriteProp's logical ok=false would still carry transport Status::Ok.
        let resp = Response::ok(ResponsePayload::WriteProp {
            ok: false,
            error: String::new(),
        });
        assert!(resp.is_ok());
        match resp.payload {
            Some(ResponsePayload::WriteProp { ok, .. }) => assert!(!ok),
            _ => panic!("expected WriteProp payload"),
        }
    }

    proptest::proptest! {
        #[test]
        fn write_query_key_roundtrips_arbitrary(key in "[a-zA-Z0-9_]{0,32}") {
            roundtrip_request(RequestPayload::WriteQuery { key });
        }
    }
}
