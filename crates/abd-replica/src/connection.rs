//! Per-connection buffering and framing state for the mio reactor.

use std::io::{self, Read, Write};

use bytes::BytesMut;
use mio::net::TcpStream;
use mio::{Interest, Token};

use abd_wire::{FRAME_HEADER_SIZE, Frame, Request, Response};

use crate::error::ReplicaResult;

const INITIAL_BUFFER_SIZE: usize = 4096;

/// State of one client TCP connection.
pub struct Connection {
    /// Token this connection is registered under (kept for logging).
    #[allow(dead_code)]
    pub token: Token,
    pub stream: TcpStream,
    pub read_buf: BytesMut,
    pub write_buf: BytesMut,
    /// Set once the peer has closed its side or a fatal I/O error occurred.
    pub closing: bool,
}

impl Connection {
    pub fn new(token: Token, stream: TcpStream) -> Self {
        Self {
            token,
            stream,
            read_buf: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            write_buf: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            closing: false,
        }
    }

    /// Drains the socket into `read_buf` until it would block or the peer
    /// closes. Returns `false` once the peer has closed its write half.
    pub fn read(&mut self) -> io::Result<bool> {
        let mut tmp = [0u8; INITIAL_BUFFER_SIZE];
        loop {
            match self.stream.read(&mut tmp) {
                Ok(0) => return Ok(false),
                Ok(n) => self.read_buf.extend_from_slice(&tmp[..n]),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(true),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Flushes as much of `write_buf` to the socket as it will accept.
    /// Returns `true` once the whole buffer has been written.
    pub fn write(&mut self) -> io::Result<bool> {
        while !self.write_buf.is_empty() {
            match self.stream.write(&self.write_buf) {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::WriteZero, "wrote zero bytes"));
                }
                Ok(n) => {
                    let _ = self.write_buf.split_to(n);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// Attempts to decode one complete request from the front of `read_buf`.
    pub fn try_decode_request(&mut self) -> ReplicaResult<Option<Request>> {
        match Frame::decode(&mut self.read_buf)? {
            Some(frame) => Ok(Some(Request::from_frame(&frame)?)),
            None => Ok(None),
        }
    }

    /// Appends `response`'s frame to `write_buf`.
    pub fn queue_response(&mut self, response: &Response) -> ReplicaResult<()> {
        let frame = response.to_frame()?;
        frame.encode(&mut self.write_buf);
        Ok(())
    }

    /// The poll interest this connection currently needs.
    pub fn interest(&self) -> Interest {
        if self.write_buf.is_empty() {
            Interest::READABLE
        } else {
            Interest::READABLE | Interest::WRITABLE
        }
    }

    pub fn has_pending_frame(&self) -> bool {
        self.read_buf.len() >= FRAME_HEADER_SIZE
    }
}
