//! Logical directory roots and path validation

use crate::error::{FileAccessError, Result};
use bridge_traits::{ExternalDir, PlatformDirectories};
use core_async::fs;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Directory table exposed to hosts as constants
///
/// Resolved once when the engine is constructed and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dirs {
    /// Read-only application bundle
    pub main_bundle_dir: PathBuf,
    /// Disposable files; default destination of `fetch`
    pub cache_dir: PathBuf,
    /// Persistent user documents; its volume is what `df` reports
    pub document_dir: PathBuf,
    pub database_dir: Option<PathBuf>,
    pub library_dir: Option<PathBuf>,
}

impl Dirs {
    /// Read every root from the platform
    ///
    /// The bundle, cache and document roots are mandatory; a platform that
    /// cannot name them is `Unavailable`.
    pub fn resolve(platform: &dyn PlatformDirectories) -> Result<Self> {
        let required = |name: &str, dir: bridge_traits::error::Result<PathBuf>| {
            let dir = dir.map_err(|e| {
                FileAccessError::Unavailable(format!("Cannot resolve {}: {}", name, e))
            })?;
            ensure_absolute(&dir)?;
            Ok::<_, FileAccessError>(dir)
        };

        let dirs = Self {
            main_bundle_dir: required("MainBundleDir", platform.main_bundle_dir())?,
            cache_dir: required("CacheDir", platform.cache_dir())?,
            document_dir: required("DocumentDir", platform.document_dir())?,
            database_dir: platform.database_dir().filter(|p| p.is_absolute()),
            library_dir: platform.library_dir().filter(|p| p.is_absolute()),
        };

        debug!(?dirs, "Resolved directory table");
        Ok(dirs)
    }

    /// Create the writable app-private roots if the platform has not yet
    pub(crate) async fn prepare(&self) -> Result<()> {
        for dir in [&self.cache_dir, &self.document_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| FileAccessError::io(dir, e))?;
        }
        Ok(())
    }
}

/// Shared-storage lookup
///
/// External roots are never cached: mounts and grants change while the
/// application runs.
#[derive(Clone)]
pub struct PathResolver {
    platform: Arc<dyn PlatformDirectories>,
}

impl PathResolver {
    pub fn new(platform: Arc<dyn PlatformDirectories>) -> Self {
        Self { platform }
    }

    pub fn external_dir(&self, dir: ExternalDir) -> Result<PathBuf> {
        let path = self
            .platform
            .external_dir(dir)
            .map_err(|e| FileAccessError::bridge(dir.as_str(), e))?;
        ensure_absolute(&path)?;
        Ok(path)
    }
}

/// Reject relative paths
///
/// Callers always pass absolute paths built from [`Dirs`]; nothing is ever
/// resolved against the process working directory.
pub fn ensure_absolute(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(FileAccessError::InvalidArgument(
            "Path must not be empty".to_string(),
        ));
    }
    if !path.is_absolute() {
        return Err(FileAccessError::InvalidArgument(format!(
            "Path must be absolute: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Require a single plain file name component
pub fn ensure_file_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(FileAccessError::InvalidArgument(format!(
            "Expected a plain file name, got {:?}",
            name
        ))),
    }
}

/// Sibling path used while a file is being written
///
/// `<path>.<uuid>.part`, in the destination's own directory so the final
/// rename never crosses a filesystem boundary.
pub(crate) fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("file"));
    name.push(format!(".{}.part", uuid::Uuid::new_v4()));
    path.with_file_name(name)
}

pub(crate) fn file_name_lossy(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
