//! # abd-replica
//!
//! The replica side of the ABD replicated register (spec.md §4, §4.7):
//! a non-blocking TCP reactor exposing the five RPCs (`WriteQuery`,
//! `ReadQuery`, `WriteProp`, `AcquireLock`, `ReleaseLock`) over the wire
//! protocol defined in `abd-wire`, backed by the per-replica state in
//! `abd-store`.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      abd-replica                        │
//! │  ┌───────────┐   ┌─────────────┐   ┌────────────────┐  │
//! │  │ TcpListener│ → │ Connections │ → │   Dispatcher    │  │
//! │  │ (mio)      │   │ (mio poll)  │   │ (→ ReplicaState)│  │
//! │  └───────────┘   └─────────────┘   └────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! One `Server` instance owns one poll loop on the calling thread; there
//! is no async runtime or thread pool here, matching spec.md §9's
//! "replace cyclic self-spawning with a poll loop" redesign flag.

mod connection;
mod dispatch;
mod error;
mod server;

pub use dispatch::Dispatcher;
pub use error::{ReplicaError, ReplicaResult};
pub use server::Server;
