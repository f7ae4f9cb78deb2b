//! Platform directory resolution using the `dirs` crate

use bridge_traits::{
    error::{BridgeError, Result},
    storage::{ExternalDir, PlatformDirectories},
};
use std::path::PathBuf;
use tracing::debug;

/// Desktop directory layout
///
/// App-private roots live under the OS cache and data directories, namespaced
/// by the application name. Shared roots map onto the user's standard
/// folders (Music, Documents, Downloads, Pictures).
pub struct DesktopDirectories {
    cache_dir: PathBuf,
    document_dir: PathBuf,
    bundle_dir: Option<PathBuf>,
    database_dir: PathBuf,
    library_dir: Option<PathBuf>,
    external_root: Option<PathBuf>,
}

/// Base for app data: the OS data dir, then `~/.local/share`, then the
/// temp dir so the root is always absolute
fn data_root(data_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .or_else(|| home_dir.map(|home| home.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir)
}

impl DesktopDirectories {
    /// Resolve directories for the given application name
    pub fn new(app_name: &str) -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(app_name);

        let data_dir = data_root(dirs::data_dir(), dirs::home_dir()).join(app_name);

        // Only macOS has a meaningful per-app Library location on desktop
        let library_dir = if cfg!(target_os = "macos") {
            Some(data_dir.join("Library"))
        } else {
            None
        };

        Self {
            cache_dir,
            document_dir: data_dir.join("Documents"),
            bundle_dir: None,
            database_dir: data_dir.join("databases"),
            library_dir,
            external_root: None,
        }
    }

    /// Lay every root out under a single directory
    ///
    /// Shared roots become `<root>/external/<name>`. Useful for sandboxed
    /// hosts, portable installs and tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache_dir: root.join("cache"),
            document_dir: root.join("documents"),
            bundle_dir: Some(root.join("bundle")),
            database_dir: root.join("databases"),
            library_dir: Some(root.join("library")),
            external_root: Some(root.join("external")),
        }
    }

    /// Override the bundle directory (defaults to the executable's directory)
    pub fn with_bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundle_dir = Some(dir.into());
        self
    }

    fn standard_external_dir(dir: ExternalDir) -> Option<PathBuf> {
        match dir {
            ExternalDir::Audio => dirs::audio_dir(),
            ExternalDir::Documents => dirs::document_dir(),
            ExternalDir::Downloads => dirs::download_dir(),
            ExternalDir::Images => dirs::picture_dir(),
        }
    }
}

impl PlatformDirectories for DesktopDirectories {
    fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir.clone())
    }

    fn document_dir(&self) -> Result<PathBuf> {
        Ok(self.document_dir.clone())
    }

    fn main_bundle_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.bundle_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe()?;
        exe.parent().map(PathBuf::from).ok_or_else(|| {
            BridgeError::NotAvailable("Executable has no parent directory".to_string())
        })
    }

    fn database_dir(&self) -> Option<PathBuf> {
        Some(self.database_dir.clone())
    }

    fn library_dir(&self) -> Option<PathBuf> {
        self.library_dir.clone()
    }

    fn external_dir(&self, dir: ExternalDir) -> Result<PathBuf> {
        let resolved = match &self.external_root {
            Some(root) => Some(root.join(dir.as_str())),
            None => Self::standard_external_dir(dir),
        };

        let resolved = resolved.ok_or_else(|| {
            BridgeError::NotAvailable(format!("No {} directory on this system", dir))
        })?;
        debug!(dir = %dir, path = ?resolved, "Resolved external directory");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_layout() {
        let dirs = DesktopDirectories::with_root("/srv/app");

        assert_eq!(dirs.cache_dir().unwrap(), PathBuf::from("/srv/app/cache"));
        assert_eq!(
            dirs.document_dir().unwrap(),
            PathBuf::from("/srv/app/documents")
        );
        assert_eq!(
            dirs.main_bundle_dir().unwrap(),
            PathBuf::from("/srv/app/bundle")
        );
        assert_eq!(
            dirs.database_dir(),
            Some(PathBuf::from("/srv/app/databases"))
        );
        assert_eq!(
            dirs.external_dir(ExternalDir::Downloads).unwrap(),
            PathBuf::from("/srv/app/external/downloads")
        );
    }

    #[test]
    fn test_data_root_fallbacks() {
        assert_eq!(
            data_root(Some(PathBuf::from("/data")), Some(PathBuf::from("/home/u"))),
            PathBuf::from("/data")
        );
        assert_eq!(
            data_root(None, Some(PathBuf::from("/home/u"))),
            PathBuf::from("/home/u/.local/share")
        );

        let without_home = data_root(None, None);
        assert!(without_home.is_absolute());
        assert_eq!(without_home, std::env::temp_dir());
    }

    #[test]
    fn test_default_layout_is_namespaced() {
        let dirs = DesktopDirectories::new("file-access-test");

        assert!(dirs.cache_dir().unwrap().ends_with("file-access-test"));
        assert!(dirs
            .document_dir()
            .unwrap()
            .to_string_lossy()
            .contains("file-access-test"));
        assert!(dirs.main_bundle_dir().unwrap().is_absolute());
    }

    #[test]
    fn test_bundle_override() {
        let dirs = DesktopDirectories::new("app").with_bundle_dir("/opt/app/resources");
        assert_eq!(
            dirs.main_bundle_dir().unwrap(),
            PathBuf::from("/opt/app/resources")
        );
    }
}
