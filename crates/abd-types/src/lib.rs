//! Core types shared across the ABD replicated register:
//! - Version tags ([`Tag`])
//! - Register entries ([`RegisterEntry`])
//! - Lock entries ([`LockEntry`])
//!
//! These types carry no I/O and no synchronization; they are pure values
//! used by the replica store, the wire codec, and the client protocols.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A totally ordered version identifier `(counter, writer_id)`.
///
/// Ordering is defined by counter first, then `writer_id` lexicographically.
/// Two tags with equal counter and writer_id compare equal; no other field
/// participates. [`Tag::default`] is the minimum tag `(0, "")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Tag {
    pub counter: u64,
    pub writer_id: String,
}

impl Tag {
    /// The minimum tag, `(0, "")`. Every key absent from a replica is
    /// semantically equivalent to this tag.
    pub fn min() -> Self {
        Self::default()
    }

    /// Constructs a tag directly.
    pub fn new(counter: u64, writer_id: impl Into<String>) -> Self {
        Self {
            counter,
            writer_id: writer_id.into(),
        }
    }

    /// The next tag proposable by `writer_id` given this tag was the
    /// maximum observed: `(counter + 1, writer_id)`.
    pub fn next(&self, writer_id: impl Into<String>) -> Self {
        Self {
            counter: self.counter + 1,
            writer_id: writer_id.into(),
        }
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counter
            .cmp(&other.counter)
            .then_with(|| self.writer_id.cmp(&other.writer_id))
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, self.writer_id)
    }
}

/// A `(tag, value)` pair stored per key at a replica.
///
/// Absence of a key at a replica is semantically equivalent to
/// `RegisterEntry::default()` (tag `(0, "")`, value `""`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegisterEntry {
    pub tag: Tag,
    pub value: String,
}

impl RegisterEntry {
    pub fn new(tag: Tag, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// Applies the tag-max merge rule: replaces `self` with `incoming` iff
    /// `incoming.tag` is strictly greater than `self.tag`. Returns whether a
    /// replacement occurred.
    pub fn merge(&mut self, incoming: &RegisterEntry) -> bool {
        if incoming.tag > self.tag {
            *self = incoming.clone();
            true
        } else {
            false
        }
    }
}

/// The holder of a per-key advisory lock, or absence (unlocked).
///
/// A replica's lock table stores `Option<LockEntry>` per key; `None` and a
/// missing table entry are both "unlocked".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub holder: String,
}

impl LockEntry {
    pub fn new(holder: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn min_tag_is_zero_counter_empty_writer() {
        let t = Tag::min();
        assert_eq!(t.counter, 0);
        assert_eq!(t.writer_id, "");
    }

    #[test_case(Tag::new(1, "a"), Tag::new(2, "a"), Ordering::Less; "counter breaks tie")]
    #[test_case(Tag::new(5, "a"), Tag::new(5, "b"), Ordering::Less; "writer_id breaks tie on equal counter")]
    #[test_case(Tag::new(5, "b"), Tag::new(5, "a"), Ordering::Greater; "writer_id reversed")]
    #[test_case(Tag::new(3, "x"), Tag::new(3, "x"), Ordering::Equal; "fully equal")]
    fn tag_total_order(a: Tag, b: Tag, expected: Ordering) {
        assert_eq!(a.cmp(&b), expected);
    }

    #[test]
    fn equal_tags_never_replace() {
        let mut entry = RegisterEntry::new(Tag::new(4, "x"), "old");
        let incoming = RegisterEntry::new(Tag::new(4, "x"), "new");
        let replaced = entry.merge(&incoming);
        assert!(!replaced);
        assert_eq!(entry.value, "old");
    }

    #[test]
    fn strictly_greater_tag_replaces() {
        let mut entry = RegisterEntry::new(Tag::new(4, "x"), "old");
        let incoming = RegisterEntry::new(Tag::new(5, "y"), "new");
        let replaced = entry.merge(&incoming);
        assert!(replaced);
        assert_eq!(entry.value, "new");
        assert_eq!(entry.tag, Tag::new(5, "y"));
    }

    #[test]
    fn next_tag_increments_counter_and_sets_writer() {
        let max = Tag::new(7, "someone-else");
        let proposed = max.next("me");
        assert_eq!(proposed, Tag::new(8, "me"));
    }

    proptest::proptest! {
        #[test]
        fn tag_ordering_is_total(
            c1 in 0u64..1000, w1 in "[a-z]{0,5}",
            c2 in 0u64..1000, w2 in "[a-z]{0,5}",
        ) {
            let a = Tag::new(c1, w1);
            let b = Tag::new(c2, w2);
            // exactly one of <, ==, > holds
            let lt = a < b;
            let eq = a == b;
            let gt = a > b;
            prop_assert_eq!((lt as u8) + (eq as u8) + (gt as u8), 1);
        }

        #[test]
        fn merge_never_decreases_tag(
            c1 in 0u64..100, w1 in "[a-z]{1,3}",
            c2 in 0u64..100, w2 in "[a-z]{1,3}",
        ) {
            let mut entry = RegisterEntry::new(Tag::new(c1, w1), "a");
            let before = entry.tag.clone();
            let incoming = RegisterEntry::new(Tag::new(c2, w2), "b");
            entry.merge(&incoming);
            prop_assert!(entry.tag >= before);
        }
    }
}
