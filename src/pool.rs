//! Bounded, birth-ordered collection of live entities.
//!
//! Entities are stored oldest first. The cap is enforced on every push
//! according to a [`CapPolicy`], so `len() <= cap()` holds after any
//! sequence of pushes and removals.
//!
//! ```ignore
//! let mut waves = Pool::new(10, CapPolicy::DropNewest);
//! waves.trim_front_while(|w| t - w.born > ttl);
//! waves.push(Wave::spawn(t, &mut ctx));
//! for w in waves.iter() { /* oldest to newest */ }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What happens when a push would exceed the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapPolicy {
    /// The new entity is not inserted.
    #[default]
    RejectNew,
    /// The new entity is inserted, then the newest entities are popped.
    DropNewest,
    /// The new entity is inserted and the oldest entities make room.
    TrimOldest,
}

/// Ordered entity pool with a hard cap.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: VecDeque<T>,
    cap: usize,
    policy: CapPolicy,
}

impl<T> Pool<T> {
    /// A cap of zero is raised to one.
    pub fn new(cap: usize, policy: CapPolicy) -> Self {
        let cap = cap.max(1);
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
            policy,
        }
    }

    /// Insert `item` as the newest entity. Returns whether it is still live
    /// after the cap is applied.
    pub fn push(&mut self, item: T) -> bool {
        match self.policy {
            CapPolicy::RejectNew => {
                if self.items.len() >= self.cap {
                    return false;
                }
                self.items.push_back(item);
                true
            }
            CapPolicy::DropNewest => {
                self.items.push_back(item);
                let mut kept = true;
                while self.items.len() > self.cap {
                    self.items.pop_back();
                    kept = false;
                }
                kept
            }
            CapPolicy::TrimOldest => {
                self.items.push_back(item);
                while self.items.len() > self.cap {
                    self.items.pop_front();
                }
                true
            }
        }
    }

    /// Remove oldest entities while `pred` holds. Returns how many went.
    pub fn trim_front_while(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let mut n = 0;
        while self.items.front().is_some_and(&mut pred) {
            self.items.pop_front();
            n += 1;
        }
        n
    }

    /// Drop oldest entities until at most `len` remain.
    pub fn truncate_oldest(&mut self, len: usize) -> usize {
        let excess = self.items.len().saturating_sub(len);
        self.items.drain(..excess);
        excess
    }

    /// Keep entities for which `keep` returns true. Returns how many went.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    /// Mutable variant of [`Pool::retain`], used for advance-and-cull passes.
    pub fn retain_mut(&mut self, keep: impl FnMut(&mut T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain_mut(keep);
        before - self.items.len()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + ExactSizeIterator {
        self.items.iter_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn policy(&self) -> CapPolicy {
        self.policy
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
