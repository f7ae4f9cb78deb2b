//! Per-path operation ordering
//!
//! Each path gets a fair async mutex. Tokio's mutex queues waiters FIFO, so
//! operations on the same path run in the order they first asked for the
//! lock. Operations on two paths take both locks in sorted order, which rules
//! out lock-order deadlocks between e.g. `cp(a, b)` and `mv(b, a)`.

use core_async::sync::{Mutex, OwnedMutexGuard};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard};

type Registry = Arc<StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>>;

/// Registry of per-path locks
///
/// Cloning shares the registry. Entries are created on demand and pruned
/// when the last holder or waiter lets go.
#[derive(Clone, Default)]
pub struct PathLocks {
    registry: Registry,
}

/// Held locks; released on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct PathGuard {
    registry: Registry,
    held: Vec<(PathBuf, Option<OwnedMutexGuard<()>>)>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, path: &Path) -> PathGuard {
        self.lock_all(&[path]).await
    }

    pub async fn lock_pair(&self, first: &Path, second: &Path) -> PathGuard {
        self.lock_all(&[first, second]).await
    }

    /// Lock every path, in sorted order, skipping duplicates
    pub async fn lock_all(&self, paths: &[&Path]) -> PathGuard {
        let mut sorted: Vec<PathBuf> = paths.iter().map(|p| p.to_path_buf()).collect();
        sorted.sort();
        sorted.dedup();

        let mut guard = PathGuard {
            registry: Arc::clone(&self.registry),
            held: Vec::with_capacity(sorted.len()),
        };

        for path in sorted {
            let mutex = self.entry(&path);
            // Push before awaiting so a guard dropped mid-acquisition still
            // prunes the entries it created
            guard.held.push((path, None));
            let owned = mutex.lock_owned().await;
            if let Some(slot) = guard.held.last_mut() {
                slot.1 = Some(owned);
            }
        }

        guard
    }

    /// Number of paths currently locked or waited on
    pub fn tracked(&self) -> usize {
        lock_registry(&self.registry).len()
    }

    fn entry(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut map = lock_registry(&self.registry);
        Arc::clone(
            map.entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        let mut map = lock_registry(&self.registry);
        for (path, owned) in self.held.drain(..) {
            drop(owned);
            // Only the registry's own reference left: nobody holds or awaits it
            let idle = map
                .get(&path)
                .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
            if idle {
                map.remove(&path);
            }
        }
    }
}

fn lock_registry(
    registry: &StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
) -> StdMutexGuard<'_, HashMap<PathBuf, Arc<Mutex<()>>>> {
    // The map stays consistent even if a holder panicked
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entries_are_pruned() {
        let locks = PathLocks::new();
        {
            let _guard = locks.lock(Path::new("/a")).await;
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_pair_deduplicates() {
        let locks = PathLocks::new();
        let _guard = locks.lock_pair(Path::new("/a"), Path::new("/a")).await;
        assert_eq!(locks.tracked(), 1);
    }

    #[tokio::test]
    async fn test_same_path_runs_in_issue_order() {
        let locks = PathLocks::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let first = locks.lock(Path::new("/shared")).await;

        let mut tasks = Vec::new();
        for i in 0..5 {
            let locks = locks.clone();
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.lock(Path::new("/shared")).await;
                order.lock().unwrap().push(i);
            }));
            // Let each task reach the wait queue before spawning the next
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        drop(first);
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_opposite_pairs_do_not_deadlock() {
        let locks = PathLocks::new();
        let mut tasks = Vec::new();

        for i in 0..50 {
            let locks = locks.clone();
            tasks.push(tokio::spawn(async move {
                let (a, b) = if i % 2 == 0 { ("/x", "/y") } else { ("/y", "/x") };
                let _guard = locks.lock_pair(Path::new(a), Path::new(b)).await;
                tokio::task::yield_now().await;
            }));
        }

        let all = futures_util::future::join_all(tasks);
        let results = tokio::time::timeout(Duration::from_secs(5), all)
            .await
            .expect("lock pairs deadlocked");
        assert!(results.into_iter().all(|r| r.is_ok()));
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn test_different_paths_are_independent() {
        let locks = PathLocks::new();
        let _a = locks.lock(Path::new("/a")).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(Path::new("/b"))).await;
        assert!(b.is_ok());
    }
}
