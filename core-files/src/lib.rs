//! Unified file access engine.
//!
//! One API for local file I/O, bundled asset extraction, shared-storage
//! export, streaming HTTP downloads, content hashing and disk space queries.
//! Platform specifics stay behind the `bridge-traits` seams; the engine only
//! sees absolute paths, async readers and the directory table in [`Dirs`].
//!
//! Every operation on a path is ordered against every other operation on the
//! same path (see [`PathLocks`]). Operations on different paths run
//! concurrently.

pub mod api;
pub mod disk;
pub mod encoding;
pub mod error;
pub mod fetch;
pub mod hash;
pub mod io;
pub mod locks;
pub mod paths;

pub use api::FileAccess;
pub use disk::FsStat;
pub use encoding::Encoding;
pub use error::{ErrorKind, FileAccessError, Result};
pub use fetch::{FetchHandle, FetchInit, FetchProgress, FetchResult};
pub use hash::{HashAlgorithm, Hasher};
pub use io::{FileStat, FileType};
pub use locks::{PathGuard, PathLocks};
pub use paths::{Dirs, PathResolver};

pub use bridge_traits::{ExternalDir, HttpMethod};
