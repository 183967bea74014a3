// Bounded circular history of decisions for batched learning

use super::session::Decision;

/// Fixed-capacity ring of (tactic, state) pairs.
///
/// `push` reports when the write cursor wraps back to the start of a fully
/// populated buffer - the point at which one batch learning pass runs.
/// Entries are overwritten in place afterwards, never dropped early.
pub struct History {
    entries: Vec<Decision>,
    capacity: usize,
    next: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            next: 0,
        }
    }

    /// Append a decision, overwriting the oldest entry once full. Returns
    /// true when this push completed a full lap of the buffer.
    pub fn push(&mut self, decision: Decision) -> bool {
        if self.entries.len() < self.capacity {
            self.entries.push(decision);
        } else {
            self.entries[self.next] = decision;
        }
        self.next = (self.next + 1) % self.capacity;
        self.next == 0 && self.entries.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[Decision] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next = 0;
    }
}
