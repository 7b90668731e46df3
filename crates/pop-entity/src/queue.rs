//! `AgentQueue` — time-priority queue of pending ADD/DELETE agent actions.
//!
//! Firing a channel never mutates the population directly; it only appends
//! to this queue via the caller (`Entity::process_next`). The driver drains
//! the queue at the points the simulator design calls for (immediately,
//! under FM; at the end of a barrier pass, under AM).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use pop_core::{AgentId, CoreError, CoreResult};

use crate::agent::Agent;

pub enum QueueItem<WS, AS: Clone> {
    /// A freshly cloned agent awaiting finalization. Carries its own
    /// complete entity state (scheduler + channels), deep-copied at clone
    /// time.
    Add(Box<Agent<WS, AS>>),
    /// An already-live agent requesting removal, identified by id.
    Delete(AgentId),
}

struct QueueEntry<WS, AS: Clone> {
    key: f64,
    seq: u64,
    item: QueueItem<WS, AS>,
}

impl<WS, AS: Clone> PartialEq for QueueEntry<WS, AS> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}
impl<WS, AS: Clone> Eq for QueueEntry<WS, AS> {}

impl<WS, AS: Clone> PartialOrd for QueueEntry<WS, AS> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<WS, AS: Clone> Ord for QueueEntry<WS, AS> {
    // `BinaryHeap` is a max-heap; reverse so `peek`/`pop` yield the smallest
    // `(key, seq)` pair first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .partial_cmp(&self.key)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct AgentQueue<WS, AS: Clone> {
    heap: BinaryHeap<QueueEntry<WS, AS>>,
    next_seq: u64,
}

impl<WS, AS: Clone> Default for AgentQueue<WS, AS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<WS, AS: Clone> AgentQueue<WS, AS> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Enqueue a birth. `child.parent_marker()` must equal `Some(parent)` —
    /// violating the parent-marker invariant (§8 invariant 4) is a fatal
    /// simulation error, not a silent correction.
    pub fn enqueue_add(&mut self, parent: AgentId, child: Agent<WS, AS>, key: f64) -> CoreResult<()> {
        if child.parent_marker() != Some(parent) {
            return Err(CoreError::Simulation(
                "ADD queue entry requires a freshly cloned agent with parent marker set".into(),
            ));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            key,
            seq,
            item: QueueItem::Add(Box::new(child)),
        });
        Ok(())
    }

    /// Enqueue a death. The caller (`Entity::process_next`) is responsible
    /// for having already cleared the agent's parent marker and set
    /// `enabled := false` on the live agent before calling this.
    pub fn enqueue_delete(&mut self, id: AgentId, key: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            key,
            seq,
            item: QueueItem::Delete(id),
        });
    }

    pub fn dequeue(&mut self) -> Option<QueueItem<WS, AS>> {
        self.heap.pop().map(|e| e.item)
    }
}
