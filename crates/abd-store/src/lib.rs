//! Per-replica register store and lock table (spec.md §4.2, §4.3).
//!
//! [`ReplicaState`] owns both tables behind one mutex — the "single
//! serialization point" spec.md explicitly permits — so each public method
//! is one critical section. No method performs I/O while holding the lock.

use std::collections::HashMap;
use std::sync::Mutex;

use abd_types::{RegisterEntry, Tag};

/// Outcome of an `AcquireLock` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockGrant {
    pub granted: bool,
    pub holder: String,
}

struct Inner {
    registers: HashMap<String, RegisterEntry>,
    locks: HashMap<String, String>,
}

/// A single replica's register store and lock table.
pub struct ReplicaState {
    inner: Mutex<Inner>,
}

impl Default for ReplicaState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicaState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                registers: HashMap::new(),
                locks: HashMap::new(),
            }),
        }
    }

    /// Returns the stored tag for `key`, or [`Tag::min`] if absent. Never
    /// mutates state (spec.md §4.2 `WriteQuery`).
    pub fn write_query(&self, key: &str) -> Tag {
        let inner = self.inner.lock().expect("replica mutex poisoned");
        inner
            .registers
            .get(key)
            .map(|entry| entry.tag.clone())
            .unwrap_or_else(Tag::min)
    }

    /// Returns the stored `(tag, value)` for `key`, or the default entry if
    /// absent. Never mutates state (spec.md §4.2 `ReadQuery`).
    pub fn read_query(&self, key: &str) -> RegisterEntry {
        let inner = self.inner.lock().expect("replica mutex poisoned");
        inner.registers.get(key).cloned().unwrap_or_default()
    }

    /// Applies the tag-max merge rule: if `key` is absent or `incoming_tag`
    /// is strictly greater than the stored tag, replaces the entry.
    /// Otherwise leaves the entry unchanged. Always acknowledges success —
    /// per spec.md §4.2, this is a confirmation of merge processing, not a
    /// veto. Returns whether the entry was actually replaced (for
    /// diagnostics only; callers must not treat `false` as failure).
    pub fn write_prop(&self, key: &str, incoming_tag: Tag, incoming_value: String) -> bool {
        let mut inner = self.inner.lock().expect("replica mutex poisoned");
        let incoming = RegisterEntry::new(incoming_tag, incoming_value);
        match inner.registers.get_mut(key) {
            None => {
                inner.registers.insert(key.to_string(), incoming);
                true
            }
            Some(entry) => entry.merge(&incoming),
        }
    }

    /// Grants the lock on `key` to `client_id` if unheld, idempotently
    /// re-grants if `client_id` already holds it, or reports the current
    /// holder otherwise. Never blocks (spec.md §4.3 `AcquireLock`).
    pub fn acquire_lock(&self, key: &str, client_id: &str) -> LockGrant {
        let mut inner = self.inner.lock().expect("replica mutex poisoned");
        match inner.locks.get(key) {
            None => {
                inner.locks.insert(key.to_string(), client_id.to_string());
                LockGrant {
                    granted: true,
                    holder: client_id.to_string(),
                }
            }
            Some(holder) if holder == client_id => LockGrant {
                granted: true,
                holder: client_id.to_string(),
            },
            Some(holder) => LockGrant {
                granted: false,
                holder: holder.clone(),
            },
        }
    }

    /// Releases the lock on `key` iff `client_id` is the current holder.
    /// Returns whether the release took effect (spec.md §4.3
    /// `ReleaseLock`). No error status is raised either way.
    pub fn release_lock(&self, key: &str, client_id: &str) -> bool {
        let mut inner = self.inner.lock().expect("replica mutex poisoned");
        match inner.locks.get(key) {
            Some(holder) if holder == client_id => {
                inner.locks.remove(key);
                true
            }
            _ => false,
        }
    }
}
