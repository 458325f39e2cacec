//! Per-colony mutual exclusion.
//!
//! Engine operations read a whole colony and write it back; two of them on
//! the same colony must not interleave. Different colonies never contend.

use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

use crate::colony::ColonyId;

#[derive(Debug, Default)]
pub struct ColonyLocks {
    locks: Mutex<HashMap<ColonyId, Arc<Mutex<()>>>>,
}

impl ColonyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock cell for a colony, created on first use.
    pub fn handle(&self, colony: ColonyId) -> Arc<Mutex<()>> {
        self.locks.lock().entry(colony).or_default().clone()
    }

    /// Run `f` while holding the colony's lock.
    pub fn with<T>(&self, colony: ColonyId, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(colony);
        let _guard: MutexGuard<'_, ()> = handle.lock();
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_same_colony_shares_lock() {
        let locks = ColonyLocks::new();
        assert!(Arc::ptr_eq(&locks.handle(1), &locks.handle(1)));
        assert!(!Arc::ptr_eq(&locks.handle(1), &locks.handle(2)));
    }

    #[test]
    fn test_serializes_same_colony() {
        let locks = Arc::new(ColonyLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let inside = inside.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        locks.with(7, || {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
    }
}
