//! Runtime utilities for synchronous callers.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Intended for hosts and tests that have no runtime of their own. Panics if
/// the runtime cannot be created, which only happens when the OS refuses to
/// hand out the required resources.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}
