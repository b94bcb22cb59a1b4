//! Error types shared by the heap and the pathfinders built on it.

use thiserror::Error;

use crate::heap::HeapHandle;

/// Precondition violations reported by [`IndexedPriorityHeap`](crate::heap::IndexedPriorityHeap).
///
/// All of these are detectable by the caller in advance (via `count()`
/// and `contains()`), and the heap is left untouched when one is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    #[error("heap is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("heap is empty")]
    Empty,
    #[error("handle {0:?} does not address a live element")]
    NotLive(HeapHandle),
}

/// Broken heap invariant, as found by `check_invariants`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("slot {index} outranks its parent slot {parent}")]
    HeapOrder { index: usize, parent: usize },
    #[error("slot {index} is recorded at heap index {recorded}")]
    IndexMismatch { index: usize, recorded: usize },
}

/// Failure of a path query (as opposed to "no path exists", which is `Ok(None)`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("{width}x{height} grid exceeds the cell limit")]
    GridTooLarge { width: usize, height: usize },
    #[error("open set rejected a node: {0}")]
    Frontier(#[from] HeapError),
}
