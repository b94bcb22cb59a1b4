//! Indexed priority heap and the pathfinding frontiers built on it.
//!
//! This crate contains logic that is independent of any engine or
//! runtime. Functions take plain data and return results, making them
//! unit-testable and usable from headless tools as well as a game host.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`heap`] | Fixed-capacity indexed max-heap with O(log n) priority updates |
//! | [`error`] | Heap, invariant, and path query errors |
//! | [`grid`] | Grid A* with penalties, octile heuristic, no corner cutting |
//! | [`pathfinding`] | Cheapest door-to-door paths over a room graph, with cache |
//! | [`config`] | Serde-loadable pathfinding tunables and validation |

pub mod config;
pub mod error;
pub mod grid;
pub mod heap;
pub mod pathfinding;

pub use error::{HeapError, InvariantViolation, PathError};
pub use heap::{HeapHandle, IndexedPriorityHeap};
