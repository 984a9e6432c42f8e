//! Resource identifiers and the cross-thread registry of queue-pending ids.
//!
//! Every GPU-backed wrapper registers itself when it is created; the matching
//! creation command carries the id by value and releases it on the render
//! thread once the driver call completed. Until that release happens the id
//! is "pending" and the main side must treat it as in flight. This is what
//! makes early destruction safe: deletion commands also capture the id by
//! value, so nothing ever reaches across the queue by reference.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::utils::FastHashMap;

/// A 64-bit handle identifying a GPU-backed resource across threads. Zero
/// means "none" and is never registered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rid(u64);

impl Rid {
    #[inline]
    pub fn none() -> Self {
        Rid(0)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rid({})", self.0)
    }
}

/// Thread-safe map from id to pending-count, plus the id allocator. Both
/// threads touch it: the main thread registers and retains, the render thread
/// releases from inside command execution. The lock is never held across a
/// driver call.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    next: AtomicU64,
    pending: Mutex<FastHashMap<Rid, u32>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        ResourceRegistry {
            next: AtomicU64::new(1),
            pending: Mutex::new(FastHashMap::default()),
        }
    }

    /// Mints a fresh id without a pending entry. Used for resources that
    /// never cross the queue by themselves, like parsed shader data.
    pub fn allocate(&self) -> Rid {
        Rid(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Mints a fresh id and marks it pending with a count of one.
    pub fn register(&self) -> Rid {
        let rid = self.allocate();
        self.pending.lock().unwrap().insert(rid, 1);
        rid
    }

    /// Bumps the pending count; called when another queued command captures
    /// the id.
    pub fn retain(&self, rid: Rid) {
        if rid.is_none() {
            return;
        }
        *self.pending.lock().unwrap().entry(rid).or_insert(0) += 1;
    }

    /// Drops one pending reference; removes the entry at zero. Called on the
    /// render thread after the driver call completed.
    pub fn release(&self, rid: Rid) {
        if rid.is_none() {
            return;
        }

        let mut pending = self.pending.lock().unwrap();
        match pending.get_mut(&rid) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                pending.remove(&rid);
            }
            None => warn!("released {} which was not pending", rid),
        }
    }

    #[inline]
    pub fn is_pending(&self, rid: Rid) -> bool {
        self.pending.lock().unwrap().contains_key(&rid)
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_are_unique_and_nonzero() {
        let registry = ResourceRegistry::new();
        let a = registry.register();
        let b = registry.register();

        assert!(!a.is_none());
        assert!(!b.is_none());
        assert_ne!(a, b);
    }

    #[test]
    fn register_release_roundtrip() {
        let registry = ResourceRegistry::new();
        let rid = registry.register();
        assert!(registry.is_pending(rid));

        registry.release(rid);
        assert!(!registry.is_pending(rid));
        assert_eq!(registry.pending_len(), 0);
    }

    #[test]
    fn retain_counts() {
        let registry = ResourceRegistry::new();
        let rid = registry.register();
        registry.retain(rid);

        registry.release(rid);
        assert!(registry.is_pending(rid));
        registry.release(rid);
        assert!(!registry.is_pending(rid));
    }

    #[test]
    fn none_is_ignored() {
        let registry = ResourceRegistry::new();
        registry.retain(Rid::none());
        registry.release(Rid::none());
        assert_eq!(registry.pending_len(), 0);
    }
}
