//! Workspace umbrella crate.
//!
//! Host applications depend on `file-access-workspace` and get the engine
//! façade plus the runtime helpers (configuration and logging) without wiring
//! each workspace crate individually. The `desktop-shims` feature (default)
//! fills in desktop implementations for every bridge that is not injected.
//!
//! ```ignore
//! use file_access_workspace::{FileAccess, FileAccessConfig};
//!
//! let config = FileAccessConfig::builder().build()?;
//! let fs = FileAccess::new(config).await?;
//! fs.write_file(fs.dirs().document_dir.join("a.txt"), "hi", Default::default()).await?;
//! ```

pub use core_files::{
    Dirs, Encoding, ExternalDir, FetchHandle, FetchInit, FetchProgress, FetchResult, FileAccess,
    FileAccessError, FileStat, FileType, FsStat, HashAlgorithm,
};
pub use core_runtime::config::{FileAccessConfig, FileAccessConfigBuilder};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
