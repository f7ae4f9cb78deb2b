//! Async filesystem calls.
//!
//! Re-exports Tokio's `fs` module surface. Each call runs the underlying
//! syscall on the blocking pool, so awaiting never stalls the executor.

pub use tokio::fs::{
    canonicalize, copy, create_dir, create_dir_all, metadata, read, read_dir, remove_dir_all,
    remove_file, rename, symlink_metadata, try_exists, write, DirEntry, File, OpenOptions,
    ReadDir,
};
