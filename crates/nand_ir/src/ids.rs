//! Opaque ID newtypes for graph entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and `Serialize`/`Deserialize`.
//! IDs are created by [`Arena::alloc`](crate::arena::Arena::alloc); equality is identity.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub const fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub const fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a node (terminal, NAND gate or chip instance).
    NodeId,
    "n"
);

define_id!(
    /// Opaque, copyable ID for a deferred output handle.
    DeferredId,
    "d"
);

define_id!(
    /// Opaque, copyable ID for a cyclic group.
    GroupId,
    "g"
);

/// A half-open range of node IDs allocated contiguously.
///
/// Because the node arena is append-only, everything allocated while a chip
/// or cyclic scope was under construction forms one such range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct NodeRange {
    /// First node in the range.
    pub start: NodeId,
    /// One past the last node in the range.
    pub end: NodeId,
}

impl NodeRange {
    /// Creates a range from `start` (inclusive) to `end` (exclusive).
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `id` falls inside the range.
    pub fn contains(&self, id: NodeId) -> bool {
        self.start <= id && id < self.end
    }

    /// Number of nodes in the range.
    pub fn len(&self) -> usize {
        self.end.as_raw().saturating_sub(self.start.as_raw()) as usize
    }

    /// Returns `true` if the range holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the IDs in the range in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> {
        (self.start.as_raw()..self.end.as_raw()).map(NodeId::from_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_equality_is_identity() {
        let a = NodeId::from_raw(7);
        let b = NodeId::from_raw(7);
        let c = NodeId::from_raw(8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(GroupId::from_raw(1));
        set.insert(GroupId::from_raw(2));
        set.insert(GroupId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_display_has_prefix() {
        assert_eq!(NodeId::from_raw(3).to_string(), "n3");
        assert_eq!(DeferredId::from_raw(0).to_string(), "d0");
        assert_eq!(GroupId::from_raw(12).to_string(), "g12");
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = DeferredId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: DeferredId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn range_membership() {
        let range = NodeRange::new(NodeId::from_raw(2), NodeId::from_raw(5));
        assert!(!range.contains(NodeId::from_raw(1)));
        assert!(range.contains(NodeId::from_raw(2)));
        assert!(range.contains(NodeId::from_raw(4)));
        assert!(!range.contains(NodeId::from_raw(5)));
        assert_eq!(range.len(), 3);
        let ids: Vec<u32> = range.iter().map(NodeId::as_raw).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn empty_range() {
        let range = NodeRange::new(NodeId::from_raw(4), NodeId::from_raw(4));
        assert!(range.is_empty());
        assert_eq!(range.iter().count(), 0);
    }
}
