//! `mio`-based single-threaded reactor for the replica (spec.md §4.7,
//! §9 — replaces the original's per-request spawned handler with a poll
//! loop over one shared [`Dispatcher`]).

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::dispatch::Dispatcher;
use crate::error::{ReplicaError, ReplicaResult};

const LISTENER: Token = Token(0);
const EVENTS_CAPACITY: usize = 1024;
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// The replica's TCP server: owns the listener, the poll registry, and
/// every live connection's buffering state.
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    addr: SocketAddr,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    dispatcher: Dispatcher,
}

impl Server {
    /// Binds `addr` and prepares the reactor. Does not start serving until
    /// [`Server::run`] is called.
    pub fn bind(addr: SocketAddr) -> ReplicaResult<Self> {
        let poll = Poll::new().map_err(ReplicaError::Io)?;
        let mut listener = TcpListener::bind(addr).map_err(|source| ReplicaError::BindFailed {
            addr,
            source,
        })?;

        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .map_err(ReplicaError::Io)?;

        Ok(Self {
            poll,
            listener,
            addr,
            connections: HashMap::new(),
            next_token: 1,
            dispatcher: Dispatcher::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the poll loop forever, accepting connections and dispatching
    /// requests as they arrive. Returns only on a fatal I/O error.
    pub fn run(&mut self) -> ReplicaResult<()> {
        info!(addr = %self.addr, "replica listening");
        let mut events = Events::with_capacity(EVENTS_CAPACITY);

        loop {
            if let Err(e) = self.poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(ReplicaError::Io(e));
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_all()?,
                    token => self.handle_connection_event(token, event),
                }
            }

            self.connections.retain(|token, conn| {
                if conn.closing {
                    debug!(?token, "closing connection");
                    let _ = self.poll.registry().deregister(&mut conn.stream);
                    false
                } else {
                    true
                }
            });
        }
    }

    fn accept_all(&mut self) -> ReplicaResult<()> {
        loop {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;

                    self.poll
                        .registry()
                        .register(&mut stream, token, Interest::READABLE)
                        .map_err(ReplicaError::Io)?;

                    debug!(?peer, ?token, "accepted connection");
                    self.connections.insert(token, Connection::new(token, stream));
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(ReplicaError::Io(e)),
            }
        }
    }

    fn handle_connection_event(&mut self, token: Token, event: &mio::event::Event) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        if event.is_readable() {
            match conn.read() {
                Ok(true) => {}
                Ok(false) => conn.closing = true,
                Err(e) => {
                    warn!(?token, error = %e, "read failed, closing connection");
                    conn.closing = true;
                }
            }

            while conn.has_pending_frame() {
                match conn.try_decode_request() {
                    Ok(Some(request)) => {
                        let response = self.dispatcher.dispatch(request);
                        if let Err(e) = conn.queue_response(&response) {
                            warn!(?token, error = %e, "failed to encode response");
                            conn.closing = true;
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(?token, error = %e, "failed to decode request, closing connection");
                        conn.closing = true;
                        break;
                    }
                }
            }
        }

        if event.is_writable() || !conn.write_buf.is_empty() {
            match conn.write() {
                Ok(_) => {}
                Err(e) => {
                    warn!(?token, error = %e, "write failed, closing connection");
                    conn.closing = true;
                }
            }
        }

        if let Err(e) = self
            .poll
            .registry()
            .reregister(&mut conn.stream, token, conn.interest())
        {
            warn!(?token, error = %e, "failed to reregister connection");
            conn.closing = true;
        }
    }
}
