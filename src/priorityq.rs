// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Event queue for the sweep.
//
// Two phases: every input vertex is known before the sweep starts, so those
// are collected into an array and sorted once. Vertices created mid-sweep
// (intersections) go into a binary heap. `extract_min` compares the heads of
// the two and takes the smaller. Both phases support deletion through the
// handle returned by `insert`.

use std::cmp::Ordering;

/// A key with a total order. `leq(a, b) && leq(b, a)` must imply the keys are
/// the same entry, otherwise equal keys would be interchangeable.
pub trait QueueKey: Copy {
    fn leq(&self, other: &Self) -> bool;
}

/// Where a queued key lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PqHandle {
    /// Slot in the pre-sorted array.
    Sorted(usize),
    /// Slot in the heap's handle table.
    Heap(usize),
}

fn key_order<K: QueueKey>(a: &K, b: &K) -> Ordering {
    match (a.leq(b), b.leq(a)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

// ─────────────────────────────── Heap ──────────────────────────────────────

struct HandleSlot<K> {
    key: Option<K>,
    /// Position in `nodes` while occupied, next free handle otherwise.
    node: usize,
}

/// Index-tracking binary min-heap. `nodes[1..=size]` hold handle indices;
/// `handles[h].node` is the inverse mapping.
struct Heap<K> {
    nodes: Vec<usize>,
    handles: Vec<HandleSlot<K>>,
    size: usize,
    free_list: Option<usize>,
}

impl<K: QueueKey> Heap<K> {
    fn new() -> Self {
        Heap {
            nodes: vec![0],
            handles: Vec::new(),
            size: 0,
            free_list: None,
        }
    }

    fn key_at(&self, pos: usize) -> K {
        match self.handles[self.nodes[pos]].key {
            Some(k) => k,
            None => unreachable!("heap node {} has no key", pos),
        }
    }

    fn place(&mut self, pos: usize, handle: usize) {
        self.nodes[pos] = handle;
        self.handles[handle].node = pos;
    }

    fn float_down(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        let key = self.key_at(curr);
        loop {
            let mut child = curr << 1;
            if child < self.size && self.key_at(child + 1).leq(&self.key_at(child)) {
                child += 1;
            }
            if child > self.size || key.leq(&self.key_at(child)) {
                self.place(curr, h_curr);
                return;
            }
            let h_child = self.nodes[child];
            self.place(curr, h_child);
            curr = child;
        }
    }

    fn float_up(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        let key = self.key_at(curr);
        loop {
            let parent = curr >> 1;
            if parent == 0 || self.key_at(parent).leq(&key) {
                self.place(curr, h_curr);
                return;
            }
            let h_parent = self.nodes[parent];
            self.place(curr, h_parent);
            curr = parent;
        }
    }

    fn insert(&mut self, key: K) -> usize {
        self.size += 1;
        let curr = self.size;
        if self.nodes.len() <= curr {
            self.nodes.push(0);
        }
        let handle = match self.free_list {
            Some(h) => {
                self.free_list = Some(self.handles[h].node).filter(|&n| n != usize::MAX);
                self.handles[h].key = Some(key);
                h
            }
            None => {
                self.handles.push(HandleSlot {
                    key: Some(key),
                    node: curr,
                });
                self.handles.len() - 1
            }
        };
        self.place(curr, handle);
        self.float_up(curr);
        handle
    }

    fn minimum(&self) -> Option<K> {
        if self.size == 0 {
            None
        } else {
            Some(self.key_at(1))
        }
    }

    fn release(&mut self, handle: usize) {
        self.handles[handle].key = None;
        self.handles[handle].node = self.free_list.unwrap_or(usize::MAX);
        self.free_list = Some(handle);
    }

    fn extract_min(&mut self) -> Option<K> {
        let min = self.minimum()?;
        let h_min = self.nodes[1];
        let last = self.nodes[self.size];
        self.place(1, last);
        self.release(h_min);
        self.size -= 1;
        if self.size > 0 {
            self.float_down(1);
        }
        Some(min)
    }

    fn delete(&mut self, handle: usize) {
        debug_assert!(self.handles[handle].key.is_some());
        let curr = self.handles[handle].node;
        let last = self.nodes[self.size];
        self.place(curr, last);
        self.size -= 1;
        self.release(handle);
        if curr <= self.size {
            if curr <= 1 || self.key_at(curr >> 1).leq(&self.key_at(curr)) {
                self.float_down(curr);
            } else {
                self.float_up(curr);
            }
        }
    }
}

// ─────────────────────────── Priority queue ────────────────────────────────

pub struct PriorityQ<K> {
    heap: Heap<K>,
    keys: Vec<Option<K>>,
    /// Indices into `keys`, sorted descending so the minimum is last.
    order: Vec<usize>,
    /// Number of entries of `order` still in play.
    size: usize,
    initialized: bool,
}

impl<K: QueueKey> PriorityQ<K> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PriorityQ {
            heap: Heap::new(),
            keys: Vec::with_capacity(capacity),
            order: Vec::new(),
            size: 0,
            initialized: false,
        }
    }

    /// Sorts the keys inserted so far. Later inserts go to the heap.
    pub fn init(&mut self) {
        let keys = &self.keys;
        let mut order: Vec<usize> = (0..keys.len()).filter(|&i| keys[i].is_some()).collect();
        order.sort_unstable_by(|&a, &b| match (&keys[a], &keys[b]) {
            (Some(ka), Some(kb)) => key_order(kb, ka),
            _ => Ordering::Equal,
        });
        self.size = order.len();
        self.order = order;
        self.initialized = true;
    }

    pub fn insert(&mut self, key: K) -> PqHandle {
        if self.initialized {
            return PqHandle::Heap(self.heap.insert(key));
        }
        self.keys.push(Some(key));
        PqHandle::Sorted(self.keys.len() - 1)
    }

    fn sorted_min(&self) -> Option<K> {
        if self.size == 0 {
            None
        } else {
            self.keys[self.order[self.size - 1]]
        }
    }

    fn trim_sorted(&mut self) {
        while self.size > 0 && self.keys[self.order[self.size - 1]].is_none() {
            self.size -= 1;
        }
    }

    pub fn minimum(&self) -> Option<K> {
        debug_assert!(self.initialized);
        match (self.sorted_min(), self.heap.minimum()) {
            (Some(s), Some(h)) => Some(if h.leq(&s) { h } else { s }),
            (s, h) => s.or(h),
        }
    }

    pub fn extract_min(&mut self) -> Option<K> {
        debug_assert!(self.initialized);
        let sort_min = match self.sorted_min() {
            Some(k) => k,
            None => return self.heap.extract_min(),
        };
        if let Some(heap_min) = self.heap.minimum() {
            if heap_min.leq(&sort_min) {
                return self.heap.extract_min();
            }
        }
        self.keys[self.order[self.size - 1]] = None;
        self.size -= 1;
        self.trim_sorted();
        Some(sort_min)
    }

    pub fn delete(&mut self, handle: PqHandle) {
        match handle {
            PqHandle::Heap(h) => self.heap.delete(h),
            PqHandle::Sorted(i) => {
                debug_assert!(self.keys[i].is_some());
                self.keys[i] = None;
                if self.initialized {
                    self.trim_sorted();
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.minimum().is_none()
    }
}

impl<K: QueueKey> Default for PriorityQ<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (priority, identity) pairs; the identity breaks ties.
    #[derive(Copy, Clone, Debug, PartialEq)]
    struct Key(f64, u32);

    impl QueueKey for Key {
        fn leq(&self, other: &Self) -> bool {
            self.0 < other.0 || (self.0 == other.0 && self.1 <= other.1)
        }
    }

    fn drain(pq: &mut PriorityQ<Key>) -> Vec<u32> {
        std::iter::from_fn(|| pq.extract_min()).map(|k| k.1).collect()
    }

    #[test]
    fn sorted_phase_yields_ascending() {
        let mut pq = PriorityQ::new();
        for (i, p) in [3.0, 1.0, 2.0, 5.0, 4.0].into_iter().enumerate() {
            pq.insert(Key(p, i as u32));
        }
        pq.init();
        assert_eq!(drain(&mut pq), vec![1, 2, 0, 4, 3]);
        assert!(pq.is_empty());
    }

    #[test]
    fn ties_break_by_identity() {
        let mut pq = PriorityQ::new();
        pq.insert(Key(1.0, 7));
        pq.insert(Key(1.0, 2));
        pq.init();
        pq.insert(Key(1.0, 4));
        pq.insert(Key(1.0, 0));
        assert_eq!(drain(&mut pq), vec![0, 2, 4, 7]);
    }

    #[test]
    fn heap_inserts_interleave_with_sorted() {
        let mut pq = PriorityQ::new();
        pq.insert(Key(1.0, 0));
        pq.insert(Key(10.0, 1));
        pq.init();
        assert_eq!(pq.extract_min(), Some(Key(1.0, 0)));
        pq.insert(Key(5.0, 2));
        pq.insert(Key(0.5, 3));
        assert_eq!(pq.minimum(), Some(Key(0.5, 3)));
        assert_eq!(drain(&mut pq), vec![3, 2, 1]);
    }

    #[test]
    fn delete_from_both_phases() {
        let mut pq = PriorityQ::new();
        let a = pq.insert(Key(1.0, 0));
        pq.insert(Key(2.0, 1));
        let c = pq.insert(Key(3.0, 2));
        pq.init();
        let d = pq.insert(Key(0.0, 3));
        pq.insert(Key(4.0, 4));
        pq.delete(a);
        pq.delete(d);
        pq.delete(c);
        assert_eq!(drain(&mut pq), vec![1, 4]);
    }

    #[test]
    fn heap_handles_are_recycled() {
        let mut pq = PriorityQ::new();
        pq.init();
        let a = pq.insert(Key(2.0, 0));
        let b = pq.insert(Key(1.0, 1));
        pq.delete(b);
        let c = pq.insert(Key(3.0, 2));
        assert_eq!(b, c);
        assert_ne!(a, c);
        assert_eq!(drain(&mut pq), vec![0, 2]);
    }

    #[test]
    fn heap_survives_many_deletes() {
        let mut pq = PriorityQ::new();
        pq.init();
        let handles: Vec<_> = (0..64u32)
            .map(|i| pq.insert(Key(((i * 37) % 64) as f64, i)))
            .collect();
        for (i, h) in handles.iter().enumerate() {
            if i % 3 == 0 {
                pq.delete(*h);
            }
        }
        let mut last = f64::NEG_INFINITY;
        let mut count = 0;
        while let Some(k) = pq.extract_min() {
            assert!(k.0 >= last);
            assert!(k.1 % 3 != 0);
            last = k.0;
            count += 1;
        }
        assert_eq!(count, 64 - 22);
    }
}
