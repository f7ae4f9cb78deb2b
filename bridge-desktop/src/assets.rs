//! Bundled asset access backed by a directory on disk

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::AssetSource};
use core_async::fs;
use core_async::io::AsyncRead;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Desktop asset source
///
/// Desktop applications ship their assets as plain files next to the
/// executable, so an asset name is a relative path inside `root`.
pub struct BundleAssetSource {
    root: PathBuf,
}

impl BundleAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve an asset name, refusing anything that could escape `root`
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let confined = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        confined.then(|| self.root.join(relative))
    }
}

#[async_trait]
impl AssetSource for BundleAssetSource {
    async fn open_asset(&self, name: &str) -> Result<Option<Box<dyn AsyncRead + Send + Unpin>>> {
        let Some(path) = self.resolve(name) else {
            debug!(asset = name, "Rejected asset name outside bundle");
            return Ok(None);
        };

        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let file = fs::File::open(&path).await?;
        debug!(asset = name, "Opened bundled asset");
        Ok(Some(Box::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_async::io::AsyncReadExt;

    #[tokio::test]
    async fn test_open_existing_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        std::fs::write(dir.path().join("fonts/readme.txt"), b"asset data").unwrap();

        let source = BundleAssetSource::new(dir.path());
        let mut reader = source.open_asset("fonts/readme.txt").await.unwrap().unwrap();

        let mut content = String::new();
        reader.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "asset data");
    }

    #[tokio::test]
    async fn test_missing_and_escaping_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        let source = BundleAssetSource::new(dir.path().join("sub"));

        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();

        assert!(source.open_asset("missing.txt").await.unwrap().is_none());
        assert!(source.open_asset("../secret.txt").await.unwrap().is_none());
        assert!(source.open_asset("/etc/passwd").await.unwrap().is_none());
        assert!(source.open_asset("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_is_not_an_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();

        let source = BundleAssetSource::new(dir.path());
        assert!(source.open_asset("images").await.unwrap().is_none());
    }
}
