//! Storage Abstractions
//!
//! Platform capabilities the file access engine consumes but cannot provide
//! by itself: the location of logical directory roots, read access to bundled
//! assets, OS-level grants for shared storage, and volume capacity figures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

/// Logical shared-storage root outside the application sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalDir {
    Audio,
    Documents,
    Downloads,
    Images,
}

impl ExternalDir {
    pub const ALL: [ExternalDir; 4] = [
        ExternalDir::Audio,
        ExternalDir::Documents,
        ExternalDir::Downloads,
        ExternalDir::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalDir::Audio => "audio",
            ExternalDir::Documents => "documents",
            ExternalDir::Downloads => "downloads",
            ExternalDir::Images => "images",
        }
    }

    /// Parse a host-supplied name, case-insensitively
    ///
    /// `"pictures"` is accepted as an alias of [`ExternalDir::Images`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "audio" | "music" => Some(ExternalDir::Audio),
            "documents" => Some(ExternalDir::Documents),
            "downloads" => Some(ExternalDir::Downloads),
            "images" | "pictures" => Some(ExternalDir::Images),
            _ => None,
        }
    }
}

impl fmt::Display for ExternalDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform directory provider
///
/// Maps logical roots to absolute locations:
/// - Desktop: XDG / Known Folders / Apple standard directories
/// - iOS: `NSSearchPathForDirectoriesInDomains`
/// - Android: `Context.getCacheDir()`, `getFilesDir()`, `MediaStore`
///
/// The app-private roots are read once when the engine starts. External
/// roots are looked up on every call because grants and mounts can change.
pub trait PlatformDirectories: Send + Sync {
    /// Directory for disposable files the OS may purge
    fn cache_dir(&self) -> Result<PathBuf>;

    /// Directory for persistent user-visible documents
    fn document_dir(&self) -> Result<PathBuf>;

    /// Read-only directory holding the application bundle
    fn main_bundle_dir(&self) -> Result<PathBuf>;

    /// Database directory, on platforms that define one
    fn database_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Library directory, on platforms that define one
    fn library_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Resolve a shared-storage root
    fn external_dir(&self, dir: ExternalDir) -> Result<PathBuf>;
}

/// Bundled asset resolver
///
/// Assets ship inside the application package (APK assets, app bundle
/// resources) and can only be read through platform APIs.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Open a named asset for streaming reads
    ///
    /// Returns `Ok(None)` when no asset with that name exists.
    async fn open_asset(
        &self,
        name: &str,
    ) -> Result<Option<Box<dyn core_async::io::AsyncRead + Send + Unpin>>>;
}

/// External storage capability check
///
/// On platforms that gate shared storage behind a runtime permission
/// (e.g. `WRITE_EXTERNAL_STORAGE` below Android 10), this reports whether
/// the permission is currently held. Requesting it is the host's job.
#[async_trait]
pub trait StorageGrant: Send + Sync {
    /// Whether writes into `dir` are currently permitted
    async fn is_granted(&self, dir: ExternalDir) -> Result<bool>;
}

/// Capacity snapshot of one mounted volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeStats {
    pub mount_point: PathBuf,
    pub available_space: u64,
    pub total_space: u64,
}

/// Volume capacity provider
///
/// Implementations may block while querying the OS; callers run them off the
/// async executor.
pub trait VolumeInfo: Send + Sync {
    /// List every mounted volume the platform reports
    fn volumes(&self) -> Result<Vec<VolumeStats>>;
}
