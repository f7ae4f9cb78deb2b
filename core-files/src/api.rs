//! Public facade
//!
//! [`FileAccess`] is the one type hosts talk to. It validates arguments,
//! serializes work per path through [`PathLocks`], and delegates to the
//! streaming core, hashing, fetch and disk modules.

use crate::disk::{self, FsStat};
use crate::encoding::Encoding;
use crate::error::{FileAccessError, Result};
use crate::fetch::{FetchEngine, FetchHandle, FetchInit};
use crate::hash::{self, HashAlgorithm};
use crate::io::{FileIo, FileStat};
use crate::locks::PathLocks;
use crate::paths::{ensure_absolute, ensure_file_name, Dirs, PathResolver};
use bridge_traits::{AssetSource, ExternalDir, StorageGrant, VolumeInfo};
use core_runtime::config::FileAccessConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Unified file access engine
///
/// Cheap to clone; clones share locks, bridges and the directory table.
///
/// # Example
///
/// ```ignore
/// use core_files::{Encoding, FileAccess, HashAlgorithm};
/// use core_runtime::config::FileAccessConfig;
///
/// let files = FileAccess::new(FileAccessConfig::builder().build()?).await?;
/// let notes = files.dirs().document_dir.join("notes.txt");
///
/// files.write_file(&notes, "hello", Encoding::Utf8).await?;
/// let digest = files.hash(&notes, HashAlgorithm::Sha256).await?;
/// ```
#[derive(Clone)]
pub struct FileAccess {
    inner: Arc<Inner>,
}

struct Inner {
    dirs: Dirs,
    resolver: PathResolver,
    io: FileIo,
    fetcher: FetchEngine,
    assets: Arc<dyn AssetSource>,
    grant: Arc<dyn StorageGrant>,
    volumes: Arc<dyn VolumeInfo>,
    locks: PathLocks,
}

impl FileAccess {
    /// Resolve the directory table and wire the bridges together
    ///
    /// Creates the cache and document roots if they do not exist yet.
    pub async fn new(config: FileAccessConfig) -> Result<Self> {
        let dirs = Dirs::resolve(config.directories.as_ref())?;
        dirs.prepare().await?;

        let locks = PathLocks::new();
        let fetcher = FetchEngine::new(
            Arc::clone(&config.http_client),
            dirs.cache_dir.clone(),
            config.request_timeout,
            locks.clone(),
        );

        debug!(chunk_size = config.chunk_size, "File access engine ready");

        Ok(Self {
            inner: Arc::new(Inner {
                resolver: PathResolver::new(Arc::clone(&config.directories)),
                io: FileIo::new(config.chunk_size),
                fetcher,
                assets: config.asset_source,
                grant: config.storage_grant,
                volumes: config.volume_info,
                locks,
                dirs,
            }),
        })
    }

    /// Engine with every bridge defaulted to its desktop implementation
    #[cfg(feature = "desktop-shims")]
    pub async fn with_defaults() -> Result<Self> {
        let config = FileAccessConfig::builder()
            .build()
            .map_err(|e| FileAccessError::Unavailable(e.to_string()))?;
        Self::new(config).await
    }

    /// The directory table resolved at construction
    pub fn dirs(&self) -> &Dirs {
        &self.inner.dirs
    }

    pub async fn append_file(
        &self,
        path: impl AsRef<Path>,
        data: &str,
        encoding: Encoding,
    ) -> Result<()> {
        let path = path.as_ref();
        ensure_absolute(path)?;
        let bytes = encoding.to_bytes(data)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.append_file(path, &bytes).await
    }

    pub async fn write_file(
        &self,
        path: impl AsRef<Path>,
        data: &str,
        encoding: Encoding,
    ) -> Result<()> {
        let path = path.as_ref();
        ensure_absolute(path)?;
        let bytes = encoding.to_bytes(data)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.write_file(path, &bytes).await
    }

    /// [`write_file`](Self::write_file) with the encoding given by name
    pub async fn write_file_str_encoding(
        &self,
        path: impl AsRef<Path>,
        data: &str,
        encoding: &str,
    ) -> Result<()> {
        let encoding = encoding.parse::<Encoding>()?;
        self.write_file(path, data, encoding).await
    }

    /// Whole file as UTF-8 text; invalid sequences become U+FFFD
    pub async fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        self.read_file_with_encoding(path, Encoding::Utf8).await
    }

    /// Whole file rendered under `encoding` (`Base64` for binary content)
    pub async fn read_file_with_encoding(
        &self,
        path: impl AsRef<Path>,
        encoding: Encoding,
    ) -> Result<String> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        let bytes = self.inner.io.read_file(path).await?;
        Ok(encoding.to_text(&bytes))
    }

    pub async fn cp(&self, source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
        let (source, target) = (source.as_ref(), target.as_ref());
        ensure_absolute(source)?;
        ensure_absolute(target)?;

        let _guard = self.inner.locks.lock_pair(source, target).await;
        self.inner.io.cp(source, target).await.map(|_| ())
    }

    pub async fn mv(&self, source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
        let (source, target) = (source.as_ref(), target.as_ref());
        ensure_absolute(source)?;
        ensure_absolute(target)?;

        let _guard = self.inner.locks.lock_pair(source, target).await;
        self.inner.io.mv(source, target).await
    }

    /// Copy a bundled asset to `target`
    pub async fn cp_asset(&self, asset: &str, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        ensure_absolute(target)?;

        let _guard = self.inner.locks.lock(target).await;
        let reader = self
            .inner
            .assets
            .open_asset(asset)
            .await
            .map_err(|e| FileAccessError::bridge(asset, e))?
            .ok_or_else(|| FileAccessError::AssetNotFound {
                asset: asset.to_string(),
            })?;

        let copied = self
            .inner
            .io
            .write_from_reader(reader, Path::new(asset), target)
            .await?;
        debug!(asset, target = ?target, bytes = copied, "Copied asset");
        Ok(())
    }

    /// Copy `source` into a shared directory as `target_name`
    ///
    /// Fails with `PermissionDenied` when the platform has not granted
    /// shared-storage access.
    pub async fn cp_external(
        &self,
        source: impl AsRef<Path>,
        target_name: &str,
        dir: ExternalDir,
    ) -> Result<()> {
        let source = source.as_ref();
        ensure_absolute(source)?;
        ensure_file_name(target_name)?;

        let root = self.inner.resolver.external_dir(dir)?;
        let granted = self
            .inner
            .grant
            .is_granted(dir)
            .await
            .map_err(|e| FileAccessError::bridge(&root, e))?;
        if !granted {
            return Err(FileAccessError::PermissionDenied { path: root });
        }

        let target = root.join(target_name);
        let _guard = self
            .inner
            .locks
            .lock_all(&[source, root.as_path(), target.as_path()])
            .await;

        self.inner.io.mkdir(&root).await?;
        self.inner.io.cp(source, &target).await?;
        debug!(dir = %dir, target = ?target, "Copied to shared storage");
        Ok(())
    }

    /// [`cp_external`](Self::cp_external) with the directory given by name
    pub async fn cp_external_named(
        &self,
        source: impl AsRef<Path>,
        target_name: &str,
        dir: &str,
    ) -> Result<()> {
        let dir = ExternalDir::from_name(dir).ok_or_else(|| {
            FileAccessError::InvalidArgument(format!("Unknown external directory: {}", dir))
        })?;
        self.cp_external(source, target_name, dir).await
    }

    /// Append `source` onto `target`; returns the number of bytes appended
    pub async fn concat_files(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> Result<u64> {
        let (source, target) = (source.as_ref(), target.as_ref());
        ensure_absolute(source)?;
        ensure_absolute(target)?;

        let _guard = self.inner.locks.lock_pair(source, target).await;
        self.inner.io.concat_files(source, target).await
    }

    /// Remove a file or a whole directory tree
    pub async fn unlink(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.unlink(path).await
    }

    pub async fn mkdir(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.mkdir(path).await
    }

    pub async fn ls(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.ls(path).await
    }

    /// Never fails: invalid or unreachable paths simply do not exist
    pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if ensure_absolute(path).is_err() {
            return false;
        }

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.exists(path).await
    }

    pub async fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if ensure_absolute(path).is_err() {
            return false;
        }

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.is_dir(path).await
    }

    pub async fn stat(&self, path: impl AsRef<Path>) -> Result<FileStat> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.stat(path).await
    }

    /// Stat every immediate child of a directory, sorted by name
    pub async fn stat_dir(&self, path: impl AsRef<Path>) -> Result<Vec<FileStat>> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        self.inner.io.stat_dir(path).await
    }

    /// Space on the volume holding the document directory
    pub async fn df(&self) -> Result<FsStat> {
        disk::df(
            Arc::clone(&self.inner.volumes),
            self.inner.dirs.document_dir.clone(),
        )
        .await
    }

    /// Lowercase hex digest of the file's content
    pub async fn hash(&self, path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Result<String> {
        let path = path.as_ref();
        ensure_absolute(path)?;

        let _guard = self.inner.locks.lock(path).await;
        hash::hash_file(path, algorithm, self.inner.io.chunk_size()).await
    }

    /// [`hash`](Self::hash) with the algorithm given by name
    pub async fn hash_named(&self, path: impl AsRef<Path>, algorithm: &str) -> Result<String> {
        let algorithm = algorithm.parse::<HashAlgorithm>()?;
        self.hash(path, algorithm).await
    }

    /// Start downloading `resource` to disk
    ///
    /// Argument errors are returned here; everything else resolves through
    /// the returned handle. Returns once the destination is locked, so later
    /// calls on the same path run after the download.
    pub async fn fetch(
        &self,
        resource: impl Into<String>,
        init: FetchInit,
    ) -> Result<FetchHandle> {
        self.inner.fetcher.start(resource, init).await
    }

    /// Where a shared directory currently lives
    pub fn external_dir(&self, dir: ExternalDir) -> Result<PathBuf> {
        self.inner.resolver.external_dir(dir)
    }
}

impl std::fmt::Debug for FileAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAccess")
            .field("dirs", &self.inner.dirs)
            .field("chunk_size", &self.inner.io.chunk_size())
            .finish()
    }
}
