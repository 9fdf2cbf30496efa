//! The non-blocking client protocol (spec.md §4.5): session state is the
//! replica list plus an immutable `writer_id`, with derived quorum sizes
//! `R = W = ⌊N/2⌋ + 1`.

use std::net::SocketAddr;

use tracing::info;

use crate::client_id::derive_writer_id;
use crate::error::ClientResult;
use crate::protocol::{two_phase_get, two_phase_put};

/// A client session against a fixed set of replicas.
pub struct Session {
    replicas: Vec<SocketAddr>,
    writer_id: String,
}

impl Session {
    /// Opens a session with a freshly derived `writer_id`.
    pub fn new(replicas: Vec<SocketAddr>) -> Self {
        Self::with_writer_id(replicas, derive_writer_id())
    }

    /// Opens a session with an explicit `writer_id` (mainly for tests,
    /// where deterministic ids make assertions simpler).
    pub fn with_writer_id(replicas: Vec<SocketAddr>, writer_id: impl Into<String>) -> Self {
        for addr in &replicas {
            info!(%addr, "connecting to replica");
        }
        Self {
            replicas,
            writer_id: writer_id.into(),
        }
    }

    pub fn writer_id(&self) -> &str {
        &self.writer_id
    }

    pub fn replicas(&self) -> &[SocketAddr] {
        &self.replicas
    }

    /// `R = W = ⌊N/2⌋ + 1` (spec.md §3).
    pub fn quorum(&self) -> usize {
        self.replicas.len() / 2 + 1
    }

    /// PUT(key, value) (spec.md §4.5).
    pub async fn put(&self, key: &str, value: &str) -> ClientResult<()> {
        two_phase_put(&self.replicas, &self.writer_id, key, value, self.quorum()).await
    }

    /// GET(key) (spec.md §4.5).
    pub async fn get(&self, key: &str) -> ClientResult<String> {
        two_phase_get(&self.replicas, key, self.quorum()).await
    }
}
