//! # abd-client
//!
//! The client side of the ABD replicated register: the quorum fan-out
//! engine (spec.md §4.4), the non-blocking client protocol (§4.5), and
//! the blocking, per-key-locked client protocol (§4.6).
//!
//! Non-blocking usage:
//!
//! ```ignore
//! let session = Session::new(replicas);
//! session.put("k", "v").await?;
//! let value = session.get("k").await?;
//! ```
//!
//! Blocking usage goes through the free functions in [`blocking`], which
//! take a [`Session`] by reference so the same session can mix blocking
//! and non-blocking calls (though doing so against the same cluster as
//! another client's non-blocking calls is undefined behavior per
//! spec.md §4.6 — the two variants are not designed to interoperate
//! safely).

mod client_id;
mod error;
mod protocol;
mod quorum;
mod session;
mod transport;

pub mod blocking;

pub use client_id::derive_writer_id;
pub use error::{ClientError, ClientResult};
pub use session::Session;
