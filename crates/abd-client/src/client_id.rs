//! Writer/client identity derivation.
//!
//! `ABDClient_async.cpp` derives `client_id_` from `getpid()` alone. A
//! process id can be reused across process lifetimes (and trivially
//! collides across containers sharing a PID namespace), so distinct
//! clients here get a random suffix appended to the process id — this
//! stays distinct across PID reuse in a way `getpid()` alone does not
//! guarantee.

use rand::Rng;

/// Derives a writer/client id unique to this process invocation.
pub fn derive_writer_id() -> String {
    let pid = std::process::id();
    let suffix: u32 = rand::thread_rng().gen();
    format!("{pid}-{suffix:08x}")
}
