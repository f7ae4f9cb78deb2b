//! Error taxonomy of the file access engine
//!
//! Every operation fails with exactly one [`FileAccessError`]. Raw
//! `std::io::Error`s never escape: they are classified here, with the path
//! they concern attached.

use bridge_traits::BridgeError;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileAccessError {
    #[error("No such file or directory: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("File already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Is a directory: {}", path.display())]
    IsADirectory { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Asset not found: {asset}")]
    AssetNotFound { asset: String },

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FileAccessError>;

/// Fieldless discriminant of [`FileAccessError`]
///
/// Hosts that reject promises with code-tagged errors use [`ErrorKind::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    NotADirectory,
    IsADirectory,
    PermissionDenied,
    AssetNotFound,
    UnsupportedAlgorithm,
    NetworkError,
    Cancelled,
    Unavailable,
    InvalidArgument,
    Io,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "ENOENT",
            ErrorKind::AlreadyExists => "EEXIST",
            ErrorKind::NotADirectory => "ENOTDIR",
            ErrorKind::IsADirectory => "EISDIR",
            ErrorKind::PermissionDenied => "EACCES",
            ErrorKind::AssetNotFound => "ENOASSET",
            ErrorKind::UnsupportedAlgorithm => "ENOTSUP",
            ErrorKind::NetworkError => "ENETWORK",
            ErrorKind::Cancelled => "ECANCELED",
            ErrorKind::Unavailable => "EUNAVAILABLE",
            ErrorKind::InvalidArgument => "EINVAL",
            ErrorKind::Io => "EIO",
        }
    }
}

impl FileAccessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileAccessError::NotFound { .. } => ErrorKind::NotFound,
            FileAccessError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            FileAccessError::NotADirectory { .. } => ErrorKind::NotADirectory,
            FileAccessError::IsADirectory { .. } => ErrorKind::IsADirectory,
            FileAccessError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            FileAccessError::AssetNotFound { .. } => ErrorKind::AssetNotFound,
            FileAccessError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            FileAccessError::NetworkError(_) => ErrorKind::NetworkError,
            FileAccessError::Cancelled => ErrorKind::Cancelled,
            FileAccessError::Unavailable(_) => ErrorKind::Unavailable,
            FileAccessError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            FileAccessError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Classify an I/O failure concerning `path`
    pub fn io(path: impl AsRef<Path>, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FileAccessError::NotFound { path },
            io::ErrorKind::AlreadyExists => FileAccessError::AlreadyExists { path },
            io::ErrorKind::PermissionDenied => FileAccessError::PermissionDenied { path },
            io::ErrorKind::NotADirectory => FileAccessError::NotADirectory { path },
            io::ErrorKind::IsADirectory => FileAccessError::IsADirectory { path },
            _ => FileAccessError::Io { path, source: err },
        }
    }

    /// Classify a bridge failure; `path` gives context to I/O and permission
    /// failures.
    pub fn bridge(path: impl AsRef<Path>, err: BridgeError) -> Self {
        match err {
            BridgeError::Network(msg) => FileAccessError::NetworkError(msg),
            BridgeError::PermissionDenied(_) => FileAccessError::PermissionDenied {
                path: path.as_ref().to_path_buf(),
            },
            BridgeError::NotAvailable(msg) | BridgeError::OperationFailed(msg) => {
                FileAccessError::Unavailable(msg)
            }
            BridgeError::Io(e) => FileAccessError::io(path, e),
        }
    }
}

/// Whether a rename failed because source and target sit on different
/// filesystems
pub(crate) fn is_cross_device(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }

    #[cfg(unix)]
    const EXDEV: i32 = 18;
    #[cfg(windows)]
    const EXDEV: i32 = 17; // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const EXDEV: i32 = -1;

    err.raw_os_error() == Some(EXDEV)
}
