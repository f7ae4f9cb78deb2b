//! Runtime abstraction layer for the file access engine.
//!
//! Engine and bridge crates depend on this crate instead of naming Tokio
//! directly. Every module re-exports the subset of the runtime the workspace
//! actually uses, so swapping or pinning the executor happens in one place.
//!
//! # Modules
//!
//! - `fs`: async filesystem calls
//! - `io`: async read/write traits and buffered adapters
//! - `task`: task spawning, including blocking work
//! - `sync`: mutexes, channels and cancellation
//! - `time`: sleep and timeouts
//! - `runtime`: entry points for synchronous callers
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! # core_async::runtime::block_on(async {
//! let handle = task::spawn(async { 42 });
//! assert_eq!(handle.await.unwrap(), 42);
//! # });
//! ```

pub mod fs;
pub mod io;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
