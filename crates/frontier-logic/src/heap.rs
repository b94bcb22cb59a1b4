//! Fixed-capacity indexed binary max-heap.
//!
//! Every live element has a heap index: its slot in the backing store.
//! The heap records that index on the element's behalf and hands the
//! caller a [`HeapHandle`] instead of the raw slot, so a changed priority
//! can be repaired in O(log n) by re-sifting from the known slot
//! (`update_item`) rather than searching for the element.
//!
//! The ordering of `T` is its priority: the greatest element is served
//! first. Pathfinding frontiers that want the cheapest node first invert
//! their `Ord` impl.
//!
//! ```
//! use frontier_logic::heap::IndexedPriorityHeap;
//!
//! let mut heap = IndexedPriorityHeap::new(4);
//! let low = heap.add(3).unwrap();
//! heap.add(5).unwrap();
//! heap.update_item(low, |p| *p = 10).unwrap();
//! assert_eq!(heap.remove_first(), Ok(10));
//! assert_eq!(heap.remove_first(), Ok(5));
//! ```

use crate::error::{HeapError, InvariantViolation};

/// Stable address of an element for as long as it is live in one heap.
///
/// Handle ids come from a pool of `capacity` ids that is recycled when an
/// element is removed and reset wholesale by `clear`. A handle kept past
/// its element's removal, or across a `clear`, may therefore address a
/// different element later on. Only use handles of elements known to be
/// live in this heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapHandle(usize);

impl HeapHandle {
    /// Raw handle id, useful as a table key.
    pub fn id(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    handle: HeapHandle,
}

/// Array-backed max-heap with O(log n) in-place priority updates.
#[derive(Debug, Clone)]
pub struct IndexedPriorityHeap<T> {
    /// Live slots. `items.len()` is the live count.
    items: Vec<Slot<T>>,
    /// handle id -> heap index. Only meaningful for live handles.
    positions: Vec<usize>,
    /// Handle ids released by `remove_first`.
    free_handles: Vec<usize>,
    next_handle: usize,
    capacity: usize,
}

impl<T: Ord> IndexedPriorityHeap<T> {
    /// Allocate a heap holding at most `capacity` elements. Never grows.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            positions: vec![0; capacity],
            free_handles: Vec::with_capacity(capacity),
            next_handle: 0,
            capacity,
        }
    }

    /// Insert `item`, returning the handle that addresses it while live.
    ///
    /// Fails with [`HeapError::CapacityExceeded`] when the heap is full.
    pub fn add(&mut self, item: T) -> Result<HeapHandle, HeapError> {
        if self.items.len() == self.capacity {
            return Err(HeapError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        // Live count < capacity, so a fresh id is always below capacity.
        let handle = HeapHandle(self.free_handles.pop().unwrap_or_else(|| {
            let id = self.next_handle;
            self.next_handle += 1;
            id
        }));

        let index = self.items.len();
        self.positions[handle.0] = index;
        self.items.push(Slot { item, handle });
        self.sort_up(index);
        Ok(handle)
    }

    /// Remove and return the highest-priority element.
    ///
    /// The last live element takes over the root and is sifted down.
    /// Fails with [`HeapError::Empty`] when there is nothing to remove.
    pub fn remove_first(&mut self) -> Result<T, HeapError> {
        if self.items.is_empty() {
            return Err(HeapError::Empty);
        }

        let first = self.items.swap_remove(0);
        self.free_handles.push(first.handle.0);

        if let Some(moved) = self.items.first() {
            self.positions[moved.handle.0] = 0;
            self.sort_down(0);
        }

        Ok(first.item)
    }

    /// Change the priority of a live element and restore the heap.
    ///
    /// `update` mutates the element in place; the heap then sifts it up
    /// and down from its current slot. Only one of the two passes can move
    /// it, so the caller need not know which way the priority went.
    /// Returns the element's new heap index.
    pub fn update_item<F>(&mut self, handle: HeapHandle, update: F) -> Result<usize, HeapError>
    where
        F: FnOnce(&mut T),
    {
        let index = self.index_of(handle).ok_or(HeapError::NotLive(handle))?;
        update(&mut self.items[index].item);
        let index = self.sort_up(index);
        Ok(self.sort_down(index))
    }

    /// Whether `handle` addresses a live element. O(1).
    pub fn contains(&self, handle: HeapHandle) -> bool {
        self.index_of(handle).is_some()
    }

    /// Current heap index of a live element.
    pub fn index_of(&self, handle: HeapHandle) -> Option<usize> {
        let index = *self.positions.get(handle.0)?;
        match self.items.get(index) {
            Some(slot) if slot.handle == handle => Some(index),
            _ => None,
        }
    }

    /// The live element behind `handle`.
    pub fn get(&self, handle: HeapHandle) -> Option<&T> {
        self.index_of(handle).map(|index| &self.items[index].item)
    }

    /// The highest-priority element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first().map(|slot| &slot.item)
    }

    /// Drop every element. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.items.clear();
        self.free_handles.clear();
        self.next_handle = 0;
    }

    /// Number of live elements.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Same as [`count`](Self::count).
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the next `add` would fail with `CapacityExceeded`.
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Fixed slot count chosen at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live elements in slot order (root first, not sorted).
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(|slot| &slot.item)
    }

    /// Verify the heap property and index consistency over every live slot.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (index, slot) in self.items.iter().enumerate() {
            let recorded = self.positions[slot.handle.0];
            if recorded != index {
                return Err(InvariantViolation::IndexMismatch { index, recorded });
            }
            if index > 0 {
                let parent = parent(index);
                if slot.item > self.items[parent].item {
                    return Err(InvariantViolation::HeapOrder { index, parent });
                }
            }
        }
        Ok(())
    }

    /// Move the element at `index` toward the root while it outranks its parent.
    fn sort_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = parent(index);
            if self.items[index].item > self.items[parent].item {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
        index
    }

    /// Move the element at `index` toward the leaves while a child outranks it.
    ///
    /// Of two children the right one is the candidate only when it is
    /// strictly greater than the left; equal children resolve to the left.
    fn sort_down(&mut self, mut index: usize) -> usize {
        let count = self.items.len();
        loop {
            let left = index * 2 + 1;
            let right = index * 2 + 2;
            if left >= count {
                break;
            }

            let mut swap_index = left;
            if right < count && self.items[left].item < self.items[right].item {
                swap_index = right;
            }

            if self.items[index].item < self.items[swap_index].item {
                self.swap(index, swap_index);
                index = swap_index;
            } else {
                break;
            }
        }
        index
    }

    /// Exchange two slots together with their recorded heap indices.
    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.positions[self.items[a].handle.0] = a;
        self.positions[self.items[b].handle.0] = b;
    }
}

#[inline(always)]
fn parent(index: usize) -> usize {
    (index - 1) / 2
}
