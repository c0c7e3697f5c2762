// SPDX-FileCopyrightText: 2025 Jens Pitkänen <jens.pitkanen@helsinki.fi>
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::{vec_deque, VecDeque};

/// Bounded FIFO queue of `T`.
///
/// Unlike a plain [`VecDeque`], pushing into a full queue fails instead of
/// growing, and the capacity can be changed after creation, evicting the
/// oldest elements if needed.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    /// Invariant: `items.len() <= capacity`.
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Queue<T> {
    pub fn new(capacity: usize) -> Queue<T> {
        Queue {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes `value` to the back of the queue, or returns it back if the
    /// queue is full.
    pub fn push_back(&mut self, value: T) -> Result<(), T> {
        if self.items.len() >= self.capacity {
            return Err(value);
        }
        self.items.push_back(value);
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek_front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The amount of elements that could be pushed before the queue is full.
    pub fn spare_capacity(&self) -> usize {
        self.capacity - self.items.len()
    }

    /// Changes the capacity of the queue. If the queue holds more than
    /// `capacity` elements, the oldest ones are removed and returned, oldest
    /// first.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<T> {
        let excess = self.items.len().saturating_sub(capacity);
        let evicted = self.items.drain(..excess).collect();
        self.capacity = capacity;
        evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates the elements from the oldest to the newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Queue;

    #[test]
    fn pushes_and_pops_in_fifo_order() {
        let mut queue = Queue::<u8>::new(2);

        assert!(queue.push_back(0).is_ok());
        assert!(queue.push_back(1).is_ok());
        assert_eq!(
            Err(2),
            queue.push_back(2),
            "pushed a third element into a queue with capacity for two?",
        );
        assert_eq!(Some(0), queue.pop_front());
        assert!(queue.push_back(2).is_ok());
        assert_eq!(Some(1), queue.pop_front());
        assert_eq!(Some(2), queue.pop_front());
        assert_eq!(
            None,
            queue.pop_front(),
            "popped a fourth element after only pushing three elements?",
        );
    }

    #[test]
    fn iter_works() {
        let mut queue = Queue::<u8>::new(3);
        queue.push_back(0).unwrap();
        queue.push_back(1).unwrap();
        queue.push_back(2).unwrap();
        queue.pop_front().unwrap();
        queue.push_back(3).unwrap();

        let mut iter = queue.iter();
        assert_eq!(Some(&1), iter.next());
        assert_eq!(Some(&2), iter.next());
        assert_eq!(Some(&3), iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn shrinking_evicts_oldest() {
        let mut queue = Queue::<u8>::new(4);
        for i in 0..4 {
            queue.push_back(i).unwrap();
        }
        assert_eq!(vec![0, 1, 2], queue.set_capacity(1));
        assert_eq!(1, queue.len());
        assert_eq!(Some(&3), queue.peek_front());
        assert!(queue.is_full());
        assert_eq!(0, queue.spare_capacity());
    }

    #[test]
    fn growing_keeps_everything() {
        let mut queue = Queue::<u8>::new(1);
        queue.push_back(7).unwrap();
        assert!(queue.set_capacity(3).is_empty());
        assert_eq!(2, queue.spare_capacity());
        assert!(queue.push_back(8).is_ok());
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut queue = Queue::<u8>::new(0);
        assert!(queue.is_full());
        assert_eq!(Err(1), queue.push_back(1));
    }
}
