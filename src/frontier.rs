//! This module provides `PriorityFrontier`, a binary-heap priority queue that always
//! yields the smallest element under a supplied ordering.

use std::cmp::Ordering;
use std::fmt;

/// A binary min-heap over a caller-supplied total order.
///
/// Elements that compare equal come out in an order fixed by the sequence of inserts and
/// pops, so identical operation sequences always yield identical results.
pub struct PriorityFrontier<T> {
    items: Vec<T>,
    compare: fn(&T, &T) -> Ordering,
}

impl<T: Ord> PriorityFrontier<T> {
    /// Creates an empty frontier ordered by `T`'s natural order, smallest first.
    pub fn new() -> Self {
        Self::with_comparator(T::cmp)
    }
}

impl<T: Ord> Default for PriorityFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityFrontier<T> {
    /// Creates an empty frontier ordered by `compare`; elements comparing `Less` come out
    /// first.
    pub fn with_comparator(compare: fn(&T, &T) -> Ordering) -> Self {
        Self {
            items: Vec::new(),
            compare,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item to the frontier.
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Returns the best item without removing it, or `None` if the frontier is empty.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Removes and returns the best item, or `None` if the frontier is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let best = self.items.pop();
        self.sift_down(0);
        best
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates over the items in heap order, which is not sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Removes every item, returning them in heap order.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    /// Consumes the frontier and returns its items best first.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.items.len());
        while let Some(item) = self.pop() {
            sorted.push(item);
        }
        sorted
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        (self.compare)(&self.items[a], &self.items[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.precedes(index, parent) {
                break;
            }
            self.items.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = index * 2 + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let child = if right < len && self.precedes(right, left) {
                right
            } else {
                left
            };
            if !self.precedes(child, index) {
                break;
            }
            self.items.swap(index, child);
            index = child;
        }
    }
}

impl<T: Clone> Clone for PriorityFrontier<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            compare: self.compare,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PriorityFrontier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityFrontier")
            .field("items", &self.items)
            .finish()
    }
}
