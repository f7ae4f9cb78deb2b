//! Task spawning and execution.
//!
//! - `spawn`: runs a future concurrently and returns an awaitable `JoinHandle`
//! - `spawn_blocking`: runs synchronous work (hash loops, directory walks) on
//!   the blocking pool
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! # core_async::runtime::block_on(async {
//! let sum = task::spawn_blocking(|| (1..=10u32).sum::<u32>()).await.unwrap();
//! assert_eq!(sum, 55);
//! # });
//! ```

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// The returned handle resolves to the task's output, or to a [`JoinError`]
/// if the task panicked or was aborted.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
