//! Error types for lrucache
//!
//! Cache operations themselves never fail. These errors are produced only by
//! the `check_invariants` walks used in tests and debugging.

use std::fmt;

/// Result type alias for lrucache invariant checks
pub type Result<T> = std::result::Result<T, Error>;

/// Structural invariant violations detected by `check_invariants`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Index and recency list disagree on the number of entries
    LengthMismatch {
        /// Entries in the key index
        indexed: usize,
        /// Entries reachable from the head of the recency list
        linked: usize,
    },

    /// More entries are held than the capacity allows
    OverCapacity {
        /// Current entry count
        len: usize,
        /// Configured capacity
        capacity: usize,
    },

    /// A node's `prev` link does not point back at its predecessor,
    /// or the list loops back on itself
    BrokenLink {
        /// Arena slot where the walk detected the problem
        slot: usize,
    },

    /// The list references an arena slot holding no node
    DanglingSlot {
        /// Empty arena slot
        slot: usize,
    },

    /// The index maps a node's key to a different slot than the node's own
    KeyMismatch {
        /// Arena slot of the node
        slot: usize,
    },

    /// The recorded tail is not the last node reached from the head
    TailMismatch {
        /// Last slot reached walking from the head
        expected: Option<usize>,
        /// Slot recorded as the tail
        actual: Option<usize>,
    },

    /// A slot on the free list still holds a node
    OccupiedFreeSlot {
        /// Arena slot on the free list
        slot: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LengthMismatch { indexed, linked } => write!(
                f,
                "Length mismatch: {} indexed entries, {} linked entries",
                indexed, linked
            ),
            Error::OverCapacity { len, capacity } => {
                write!(f, "Over capacity: {} entries (capacity {})", len, capacity)
            }
            Error::BrokenLink { slot } => write!(f, "Broken recency link at slot {}", slot),
            Error::DanglingSlot { slot } => write!(f, "Recency list references empty slot {}", slot),
            Error::KeyMismatch { slot } => write!(f, "Index does not point at slot {}", slot),
            Error::TailMismatch { expected, actual } => {
                write!(f, "Tail mismatch: expected {:?}, found {:?}", expected, actual)
            }
            Error::OccupiedFreeSlot { slot } => write!(f, "Free slot {} is still occupied", slot),
        }
    }
}

impl std::error::Error for Error {}
