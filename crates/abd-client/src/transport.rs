//! One-shot request/response over TCP (spec.md §6's "generic unary RPC
//! substrate", made concrete with `abd-wire`'s framing).
//!
//! Each call opens a fresh connection. The fan-out engine dispatches one
//! of these per replica per phase (spec.md §4.4 item 1); there is no
//! persistent connection pool, matching spec.md §5's framing of replica
//! handles as "mutable containers for connection state" without
//! mandating a particular reuse strategy.

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use abd_wire::{Frame, Request, Response};

use crate::error::{ClientError, ClientResult};

const READ_CHUNK: usize = 4096;

/// Sends `request` to `addr` and returns its decoded reply.
pub async fn call(addr: SocketAddr, request: Request) -> ClientResult<Response> {
    let mut stream = TcpStream::connect(addr).await?;

    let mut out = BytesMut::new();
    request.to_frame()?.encode(&mut out);
    stream.write_all(&out).await?;

    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    loop {
        if let Some(frame) = Frame::decode(&mut buf)? {
            return Ok(Response::from_frame(&frame)?);
        }

        let mut tmp = [0u8; READ_CHUNK];
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            return Err(ClientError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "peer closed connection before a full response was received",
            )));
        }
        buf.extend_from_slice(&tmp[..n]);
    }
}
