//! Synchronization primitives.
//!
//! The async mutexes are fair: waiters acquire the lock in the order they
//! started waiting. The engine relies on this to keep operations on a single
//! path in issuance order.
//!
//! ```rust
//! use core_async::sync::{CancellationToken, Mutex};
//!
//! # core_async::runtime::block_on(async {
//! let mutex = Mutex::new(1);
//! *mutex.lock().await += 1;
//! assert_eq!(*mutex.lock().await, 2);
//!
//! let token = CancellationToken::new();
//! token.cancel();
//! assert!(token.is_cancelled());
//! # });
//! ```

pub use tokio::sync::{
    mpsc, oneshot, watch, Mutex, MutexGuard, Notify, OwnedMutexGuard, RwLock, Semaphore,
};

pub use tokio_util::sync::CancellationToken;
