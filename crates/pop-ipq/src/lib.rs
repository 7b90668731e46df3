//! `pop-ipq` — indexed priority queue supporting decrease-key by item identity.
//!
//! A binary min-heap of `(item, key)` pairs keyed on an `f64` priority, with a
//! side map from item identity to heap index so that the priority of any
//! live item can be looked up or updated in `O(log n)` without a linear
//! search. This is the classic "Indexed Priority Queue" of Gibson & Bruck
//! (J. Phys. Chem. A, 104(9), 2000), used here to track every agent's next
//! event time.
//!
//! Tie-breaking when two keys compare equal is unspecified by the heap
//! itself — callers that need a stable order should fold a tiebreaker (e.g.
//! an insertion sequence number) into `T` or into the key.

pub mod error;


use std::hash::Hash;

use rustc_hash::FxHashMap;

pub use error::{IpqError, IpqResult};

#[derive(Debug)]
struct Entry<T> {
    item: T,
    key: f64,
}

/// Indexed priority queue over items of type `T`.
///
/// `T` must be `Copy + Eq + Hash` — items are small handles (e.g. an
/// `AgentId` or an index into an entity arena), not the entities themselves.
#[derive(Debug)]
pub struct IndexedPriorityQueue<T> {
    heap: Vec<Entry<T>>,
    index: FxHashMap<T, usize>,
}

impl<T: Copy + Eq + Hash> Default for IndexedPriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Eq + Hash> IndexedPriorityQueue<T> {
    /// An empty queue.
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Build a queue from an iterator of `(item, key)` pairs in one
    /// `O(n)` heapify pass. Fails if any item repeats.
    pub fn build(items: impl IntoIterator<Item = (T, f64)>) -> IpqResult<Self> {
        let mut pq = Self::new();
        for (item, key) in items {
            if pq.index.contains_key(&item) {
                return Err(IpqError::DuplicateItem);
            }
            let pos = pq.heap.len();
            pq.index.insert(item, pos);
            pq.heap.push(Entry { item, key });
        }
        pq.heapify();
        Ok(pq)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    /// The key currently associated with `item`.
    pub fn key_of(&self, item: &T) -> Option<f64> {
        self.index.get(item).map(|&pos| self.heap[pos].key)
    }

    /// Read the top-priority `(item, key)` pair without removing it.
    pub fn peek(&self) -> IpqResult<(T, f64)> {
        self.heap
            .first()
            .map(|e| (e.item, e.key))
            .ok_or(IpqError::Empty)
    }

    /// Insert a new item. Fails if the item is already present.
    pub fn add(&mut self, item: T, key: f64) -> IpqResult<()> {
        if self.index.contains_key(&item) {
            return Err(IpqError::DuplicateItem);
        }
        let pos = self.heap.len();
        self.heap.push(Entry { item, key });
        self.index.insert(item, pos);
        self.swim(pos);
        Ok(())
    }

    /// Update the priority key of an existing item, restoring the heap
    /// invariant. Fails if the item is not present.
    pub fn update_key(&mut self, item: T, new_key: f64) -> IpqResult<()> {
        let &pos = self.index.get(&item).ok_or(IpqError::ItemNotFound)?;
        self.heap[pos].key = new_key;
        self.restore_at(pos);
        Ok(())
    }

    /// Replace the item identity at `old`'s slot with `new`, optionally
    /// updating its key in the same step. Fails if `old` is not present or
    /// `new` is already present under a different slot.
    pub fn replace_item(&mut self, old: T, new: T, new_key: Option<f64>) -> IpqResult<()> {
        let pos = *self.index.get(&old).ok_or(IpqError::ItemNotFound)?;
        if old != new && self.index.contains_key(&new) {
            return Err(IpqError::DuplicateItem);
        }
        self.heap[pos].item = new;
        self.index.remove(&old);
        self.index.insert(new, pos);
        if let Some(key) = new_key {
            self.heap[pos].key = key;
            self.restore_at(pos);
        }
        Ok(())
    }

    /// Remove `item` from the queue and return its key. Fails if absent.
    pub fn remove(&mut self, item: &T) -> IpqResult<f64> {
        let pos = self.index.remove(item).ok_or(IpqError::ItemNotFound)?;
        let removed_key = self.heap[pos].key;
        let last = self.heap.pop().expect("index and heap length agree");
        if pos < self.heap.len() {
            self.heap[pos] = Entry {
                item: last.item,
                key: last.key,
            };
            self.index.insert(last.item, pos);
            self.restore_at(pos);
        }
        Ok(removed_key)
    }

    /// Remove and return the top-priority `(item, key)` pair.
    pub fn pop_min(&mut self) -> IpqResult<(T, f64)> {
        let (item, key) = self.peek()?;
        self.remove(&item)?;
        Ok((item, key))
    }

    fn heapify(&mut self) {
        let n = self.heap.len();
        for pos in (0..n / 2).rev() {
            self.sink(pos);
        }
    }

    /// Restore the heap invariant around `pos` after its key changed,
    /// trying the cheaper direction (swim toward the root, or sink toward
    /// the leaves) first.
    fn restore_at(&mut self, pos: usize) {
        if pos > 0 {
            let parent = (pos - 1) >> 1;
            if self.heap[pos].key < self.heap[parent].key {
                self.swim(pos);
                return;
            }
        }
        self.sink(pos);
    }

    fn swim(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) >> 1;
            if self.heap[pos].key < self.heap[parent].key {
                self.heap.swap(pos, parent);
                self.index.insert(self.heap[pos].item, pos);
                self.index.insert(self.heap[parent].item, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sink(&mut self, mut pos: usize) {
        let n = self.heap.len();
        loop {
            let mut smallest = pos;
            let left = 2 * pos + 1;
            let right = left + 1;
            if left < n && self.heap[left].key < self.heap[smallest].key {
                smallest = left;
            }
            if right < n && self.heap[right].key < self.heap[smallest].key {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.heap.swap(pos, smallest);
            self.index.insert(self.heap[pos].item, pos);
            self.index.insert(self.heap[smallest].item, smallest);
            pos = smallest;
        }
    }
}
