// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Pass-scoped slot arena.
//
// Active regions and dictionary nodes are created and released at a high rate
// during a sweep. They live in a `BucketAlloc`, which recycles freed slots and
// is dropped wholesale when the pass ends.

use std::ops::{Index, IndexMut};

pub struct BucketAlloc<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> BucketAlloc<T> {
    pub fn new() -> Self {
        BucketAlloc {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        BucketAlloc {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Stores `value` in a free slot and returns the slot index.
    pub fn alloc(&mut self, value: T) -> u32 {
        self.live += 1;
        match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(value);
                idx
            }
            None => {
                self.slots.push(Some(value));
                (self.slots.len() - 1) as u32
            }
        }
    }

    /// Releases a slot, handing back what it held.
    pub fn free(&mut self, idx: u32) -> Option<T> {
        let value = self.slots.get_mut(idx as usize)?.take();
        if value.is_some() {
            self.live -= 1;
            self.free_list.push(idx);
        }
        value
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.slots.get(idx as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.slots.get_mut(idx as usize)?.as_mut()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<T> Default for BucketAlloc<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for BucketAlloc<T> {
    type Output = T;

    fn index(&self, idx: u32) -> &T {
        match self.get(idx) {
            Some(value) => value,
            None => panic!("access to released slot {}", idx),
        }
    }
}

impl<T> IndexMut<u32> for BucketAlloc<T> {
    fn index_mut(&mut self, idx: u32) -> &mut T {
        match self.get_mut(idx) {
            Some(value) => value,
            None => panic!("access to released slot {}", idx),
        }
    }
}
