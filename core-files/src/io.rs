//! Streaming I/O core
//!
//! All transfers move data in `chunk_size` pieces, so memory stays bounded
//! regardless of file size (`read_file` being the one whole-file exception).
//! Whole-file writes go through [`StagedFile`]: bytes land in a sibling
//! `.part` file that is renamed over the destination only once complete.

use crate::error::{is_cross_device, FileAccessError, Result};
use crate::paths::{file_name_lossy, part_path};
use core_async::fs::{self, File, OpenOptions};
use core_async::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use core_async::time::unix_millis;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

/// Metadata snapshot of one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStat {
    pub path: PathBuf,
    pub size: u64,
    /// Milliseconds since the Unix epoch
    pub last_modified: i64,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub filename: String,
}

impl FileStat {
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// A destination being written through a temporary sibling
///
/// Dropping an uncommitted `StagedFile` removes the temporary file; the
/// explicit [`discard`](Self::discard) does the same without leaving work
/// for the blocking pool.
pub(crate) struct StagedFile {
    target: PathBuf,
    temp: PathBuf,
    file: Option<File>,
}

impl StagedFile {
    pub(crate) async fn create(target: &Path) -> Result<Self> {
        if let Ok(meta) = fs::metadata(target).await {
            if meta.is_dir() {
                return Err(FileAccessError::IsADirectory {
                    path: target.to_path_buf(),
                });
            }
        }

        let temp = part_path(target);
        // A missing parent is reported against the destination, not the
        // temporary name the caller never chose
        let file = File::create(&temp)
            .await
            .map_err(|e| FileAccessError::io(target, e))?;

        Ok(Self {
            target: target.to_path_buf(),
            temp,
            file: Some(file),
        })
    }

    pub(crate) fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub(crate) fn writer(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            FileAccessError::Unavailable("Staged file already closed".to_string())
        })
    }

    /// Flush, close and rename over the destination
    pub(crate) async fn commit(mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().await {
                self.discard().await;
                return Err(FileAccessError::io(&self.target, e));
            }
        }

        if let Err(e) = fs::rename(&self.temp, &self.target).await {
            self.discard().await;
            return Err(FileAccessError::io(&self.target, e));
        }

        // Committed: nothing left for Drop to clean
        self.temp = PathBuf::new();
        Ok(())
    }

    pub(crate) async fn discard(&mut self) {
        self.file.take();
        if self.temp.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = fs::remove_file(&self.temp).await {
            warn!(path = ?self.temp, error = %e, "Failed to remove temporary file");
        }
        self.temp = PathBuf::new();
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.temp.as_os_str().is_empty() {
            return;
        }
        self.file.take();
        let temp = std::mem::take(&mut self.temp);
        match core_async::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    let _ = std::fs::remove_file(&temp);
                });
            }
            Err(_) => {
                let _ = std::fs::remove_file(&temp);
            }
        }
    }
}

/// Filesystem primitives with a fixed chunk size
#[derive(Debug, Clone)]
pub struct FileIo {
    chunk_size: usize,
}

impl FileIo {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Append `bytes`, creating the file if absent
    pub async fn append_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))?;

        for chunk in bytes.chunks(self.chunk_size) {
            file.write_all(chunk)
                .await
                .map_err(|e| FileAccessError::io(path, e))?;
        }
        file.flush().await.map_err(|e| FileAccessError::io(path, e))?;

        debug!(path = ?path, bytes = bytes.len(), "Appended to file");
        Ok(())
    }

    /// Replace the file's content with `bytes`
    pub async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut staged = StagedFile::create(path).await?;
        for chunk in bytes.chunks(self.chunk_size) {
            let written = staged.writer()?.write_all(chunk).await;
            if let Err(e) = written {
                staged.discard().await;
                return Err(FileAccessError::io(path, e));
            }
        }
        staged.commit().await?;

        debug!(path = ?path, bytes = bytes.len(), "Wrote file");
        Ok(())
    }

    pub async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.require_file(path).await?;
        fs::read(path).await.map_err(|e| FileAccessError::io(path, e))
    }

    /// Copy a file; returns the number of bytes copied
    pub async fn cp(&self, source: &Path, target: &Path) -> Result<u64> {
        self.require_file(source).await?;
        let reader = File::open(source)
            .await
            .map_err(|e| FileAccessError::io(source, e))?;

        let copied = self.write_from_reader(reader, source, target).await?;
        debug!(source = ?source, target = ?target, bytes = copied, "Copied file");
        Ok(copied)
    }

    /// Stream any reader into `target` through a staged file
    ///
    /// `origin` names the reader in read errors.
    pub async fn write_from_reader<R>(
        &self,
        reader: R,
        origin: &Path,
        target: &Path,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut staged = StagedFile::create(target).await?;
        let result = pump(
            reader,
            staged.writer()?,
            self.chunk_size,
            origin,
            target,
            u64::MAX,
        )
        .await;

        match result {
            Ok(copied) => {
                staged.commit().await?;
                Ok(copied)
            }
            Err(e) => {
                staged.discard().await;
                Err(e)
            }
        }
    }

    /// Rename, falling back to copy-and-delete across filesystems
    pub async fn mv(&self, source: &Path, target: &Path) -> Result<()> {
        match fs::rename(source, target).await {
            Ok(()) => {
                debug!(source = ?source, target = ?target, "Renamed");
                Ok(())
            }
            Err(e) if is_cross_device(&e) => {
                debug!(source = ?source, target = ?target, "Cross-device move, copying");
                self.move_by_copy(source, target).await
            }
            Err(e) => Err(self.rename_error(source, target, e).await),
        }
    }

    /// Copy then delete the source
    ///
    /// Files go through a staged copy, so a failure leaves neither a partial
    /// target nor a missing source. Directory trees are copied into a staged
    /// sibling directory and renamed into place; if deleting the source tree
    /// then fails, the complete target is kept and the error reported.
    pub(crate) async fn move_by_copy(&self, source: &Path, target: &Path) -> Result<()> {
        let meta = fs::metadata(source)
            .await
            .map_err(|e| FileAccessError::io(source, e))?;

        if !meta.is_dir() {
            self.cp(source, target).await?;
            if let Err(e) = fs::remove_file(source).await {
                if let Err(cleanup) = fs::remove_file(target).await {
                    warn!(path = ?target, error = %cleanup, "Failed to roll back moved file");
                }
                return Err(FileAccessError::io(source, e));
            }
            return Ok(());
        }

        if fs::symlink_metadata(target).await.is_ok() {
            return Err(FileAccessError::AlreadyExists {
                path: target.to_path_buf(),
            });
        }

        let staging = part_path(target);
        if let Err(e) = self.copy_tree(source, &staging).await {
            if let Err(cleanup) = fs::remove_dir_all(&staging).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?staging, error = %cleanup, "Failed to remove partial copy");
                }
            }
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, target).await {
            if let Err(cleanup) = fs::remove_dir_all(&staging).await {
                warn!(path = ?staging, error = %cleanup, "Failed to remove partial copy");
            }
            return Err(FileAccessError::io(target, e));
        }

        fs::remove_dir_all(source)
            .await
            .map_err(|e| FileAccessError::io(source, e))
    }

    async fn copy_tree(&self, source: &Path, target: &Path) -> Result<()> {
        let mut pending = vec![(source.to_path_buf(), target.to_path_buf())];

        while let Some((from, to)) = pending.pop() {
            fs::create_dir(&to)
                .await
                .map_err(|e| FileAccessError::io(&to, e))?;

            let mut entries = fs::read_dir(&from)
                .await
                .map_err(|e| FileAccessError::io(&from, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| FileAccessError::io(&from, e))?
            {
                let child_from = entry.path();
                let child_to = to.join(entry.file_name());
                let meta = fs::metadata(&child_from)
                    .await
                    .map_err(|e| FileAccessError::io(&child_from, e))?;

                if meta.is_dir() {
                    pending.push((child_from, child_to));
                } else {
                    let reader = File::open(&child_from)
                        .await
                        .map_err(|e| FileAccessError::io(&child_from, e))?;
                    let mut writer = File::create(&child_to)
                        .await
                        .map_err(|e| FileAccessError::io(&child_to, e))?;
                    pump(
                        reader,
                        &mut writer,
                        self.chunk_size,
                        &child_from,
                        &child_to,
                        u64::MAX,
                    )
                    .await?;
                    writer
                        .flush()
                        .await
                        .map_err(|e| FileAccessError::io(&child_to, e))?;
                }
            }
        }

        Ok(())
    }

    /// Pin a failed rename on the path that caused it
    async fn rename_error(
        &self,
        source: &Path,
        target: &Path,
        err: std::io::Error,
    ) -> FileAccessError {
        if fs::symlink_metadata(source).await.is_err() {
            return FileAccessError::NotFound {
                path: source.to_path_buf(),
            };
        }
        FileAccessError::io(target, err)
    }

    /// Append `source` onto `target`; returns the bytes appended
    ///
    /// Only the length `source` had when the call started is copied, so
    /// concatenating a file onto itself doubles it once. On failure `target`
    /// is cut back to its original length (or removed if this call created
    /// it).
    pub async fn concat_files(&self, source: &Path, target: &Path) -> Result<u64> {
        let length = self.require_file(source).await?.len();

        let original = match fs::metadata(target).await {
            Ok(meta) if meta.is_dir() => {
                return Err(FileAccessError::IsADirectory {
                    path: target.to_path_buf(),
                })
            }
            Ok(meta) => Some(meta.len()),
            Err(_) => None,
        };

        let reader = File::open(source)
            .await
            .map_err(|e| FileAccessError::io(source, e))?;
        let mut writer = OpenOptions::new()
            .append(true)
            .create(true)
            .open(target)
            .await
            .map_err(|e| FileAccessError::io(target, e))?;

        let result = match pump(reader, &mut writer, self.chunk_size, source, target, length).await
        {
            Ok(appended) => writer
                .flush()
                .await
                .map(|_| appended)
                .map_err(|e| FileAccessError::io(target, e)),
            Err(e) => Err(e),
        };

        match result {
            Ok(appended) => {
                debug!(source = ?source, target = ?target, bytes = appended, "Concatenated files");
                Ok(appended)
            }
            Err(e) => {
                drop(writer);
                self.restore_length(target, original).await;
                Err(e)
            }
        }
    }

    async fn restore_length(&self, target: &Path, original: Option<u64>) {
        let outcome = match original {
            Some(len) => match OpenOptions::new().write(true).open(target).await {
                Ok(file) => file.set_len(len).await,
                Err(e) => Err(e),
            },
            None => fs::remove_file(target).await,
        };
        if let Err(e) = outcome {
            warn!(path = ?target, error = %e, "Failed to roll back concatenation");
        }
    }

    /// Remove a file, or a directory with everything below it
    pub async fn unlink(&self, path: &Path) -> Result<()> {
        let meta = fs::symlink_metadata(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))?;

        let removed = if meta.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };
        removed.map_err(|e| FileAccessError::io(path, e))?;

        debug!(path = ?path, "Unlinked");
        Ok(())
    }

    /// Create a directory and any missing parents
    pub async fn mkdir(&self, path: &Path) -> Result<()> {
        if let Ok(meta) = fs::metadata(path).await {
            if meta.is_dir() {
                return Ok(());
            }
            return Err(FileAccessError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        fs::create_dir_all(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))
    }

    /// Names of the immediate children, sorted
    pub async fn ls(&self, path: &Path) -> Result<Vec<String>> {
        self.require_dir(path).await?;

        let mut entries = fs::read_dir(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FileAccessError::io(path, e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }

    pub async fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    pub async fn stat(&self, path: &Path) -> Result<FileStat> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))?;

        Ok(FileStat {
            path: path.to_path_buf(),
            size: meta.len(),
            last_modified: meta.modified().map(unix_millis).unwrap_or_default(),
            file_type: if meta.is_dir() {
                FileType::Directory
            } else {
                FileType::File
            },
            filename: file_name_lossy(path),
        })
    }

    /// Stat every immediate child, sorted by name
    ///
    /// Children that vanish or dangle between listing and stat are skipped.
    pub async fn stat_dir(&self, path: &Path) -> Result<Vec<FileStat>> {
        let mut stats = Vec::new();
        for name in self.ls(path).await? {
            let child = path.join(&name);
            match self.stat(&child).await {
                Ok(stat) => stats.push(stat),
                Err(FileAccessError::NotFound { .. }) => {
                    debug!(path = ?child, "Skipping vanished entry");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(stats)
    }

    async fn require_file(&self, path: &Path) -> Result<std::fs::Metadata> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))?;
        if meta.is_dir() {
            return Err(FileAccessError::IsADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(meta)
    }

    async fn require_dir(&self, path: &Path) -> Result<()> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| FileAccessError::io(path, e))?;
        if !meta.is_dir() {
            return Err(FileAccessError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Move up to `limit` bytes from `reader` to `writer` in `chunk_size` pieces
pub(crate) async fn pump<R, W>(
    mut reader: R,
    writer: &mut W,
    chunk_size: usize,
    from: &Path,
    to: &Path,
    limit: u64,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;

    while total < limit {
        let want = usize::try_from(limit - total).map_or(buf.len(), |rest| rest.min(buf.len()));
        let read = reader
            .read(&mut buf[..want])
            .await
            .map_err(|e| FileAccessError::io(from, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buf[..read])
            .await
            .map_err(|e| FileAccessError::io(to, e))?;
        total += read as u64;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn io() -> FileIo {
        // Small chunks so multi-chunk paths get exercised
        FileIo::new(4)
    }

    fn no_part_files(dir: &Path) -> bool {
        std::fs::read_dir(dir)
            .unwrap()
            .all(|e| !e.unwrap().file_name().to_string_lossy().ends_with(".part"))
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");

        io().write_file(&path, b"hello world").await.unwrap();
        assert_eq!(io().read_file(&path).await.unwrap(), b"hello world");

        io().write_file(&path, b"short").await.unwrap();
        assert_eq!(io().read_file(&path).await.unwrap(), b"short");
        assert!(no_part_files(dir.path()));
    }

    #[tokio::test]
    async fn test_write_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("a.txt");

        let err = io().write_file(&path, b"x").await.unwrap_err();
        assert!(matches!(err, FileAccessError::NotFound { path: ref p } if p == &path));
    }

    #[tokio::test]
    async fn test_write_onto_directory() {
        let dir = TempDir::new().unwrap();
        let err = io().write_file(dir.path(), b"x").await.unwrap_err();
        assert!(matches!(err, FileAccessError::IsADirectory { .. }));
    }

    #[tokio::test]
    async fn test_append_creates_and_extends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.txt");

        io().append_file(&path, b"one,").await.unwrap();
        io().append_file(&path, b"two").await.unwrap();
        assert_eq!(io().read_file(&path).await.unwrap(), b"one,two");
    }

    #[tokio::test]
    async fn test_read_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            io().read_file(&dir.path().join("nope")).await,
            Err(FileAccessError::NotFound { .. })
        ));
        assert!(matches!(
            io().read_file(dir.path()).await,
            Err(FileAccessError::IsADirectory { .. })
        ));
    }

    #[tokio::test]
    async fn test_cp() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("src.bin");
        let target = dir.path().join("dst.bin");
        let data: Vec<u8> = (0..=255).collect();
        std::fs::write(&source, &data).unwrap();

        assert_eq!(io().cp(&source, &target).await.unwrap(), 256);
        assert_eq!(std::fs::read(&target).unwrap(), data);
        assert_eq!(std::fs::read(&source).unwrap(), data);

        assert!(matches!(
            io().cp(dir.path(), &target).await,
            Err(FileAccessError::IsADirectory { .. })
        ));
        assert!(no_part_files(dir.path()));
    }

    #[tokio::test]
    async fn test_mv_same_volume() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a");
        let target = dir.path().join("b");
        std::fs::write(&source, b"data").unwrap();

        io().mv(&source, &target).await.unwrap();
        assert!(!source.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"data");

        let err = io().mv(&source, &target).await.unwrap_err();
        assert!(matches!(err, FileAccessError::NotFound { path: ref p } if p == &source));
    }

    #[tokio::test]
    async fn test_move_by_copy_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        let target = dir.path().join("b.txt");
        std::fs::write(&source, b"moved").unwrap();

        io().move_by_copy(&source, &target).await.unwrap();
        assert!(!source.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"moved");
    }

    #[tokio::test]
    async fn test_move_by_copy_tree() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("tree");
        std::fs::create_dir_all(source.join("nested/deeper")).unwrap();
        std::fs::write(source.join("top.txt"), b"top").unwrap();
        std::fs::write(source.join("nested/deeper/leaf.txt"), b"leaf").unwrap();
        let target = dir.path().join("moved");

        io().move_by_copy(&source, &target).await.unwrap();

        assert!(!source.exists());
        assert_eq!(std::fs::read(target.join("top.txt")).unwrap(), b"top");
        assert_eq!(
            std::fs::read(target.join("nested/deeper/leaf.txt")).unwrap(),
            b"leaf"
        );
        assert!(no_part_files(dir.path()));
    }

    #[tokio::test]
    async fn test_failed_move_by_copy_keeps_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, b"keep me").unwrap();
        let target = dir.path().join("missing").join("b.txt");

        let err = io().move_by_copy(&source, &target).await.unwrap_err();
        assert!(matches!(err, FileAccessError::NotFound { .. }));
        assert_eq!(std::fs::read(&source).unwrap(), b"keep me");
        assert!(!target.exists());

        let tree = dir.path().join("tree");
        std::fs::create_dir(&tree).unwrap();
        std::fs::write(tree.join("f"), b"f").unwrap();
        let tree_target = dir.path().join("missing").join("tree");
        assert!(io().move_by_copy(&tree, &tree_target).await.is_err());
        assert!(tree.join("f").exists());
        assert!(!tree_target.exists());
    }

    #[tokio::test]
    async fn test_concat() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("tail");
        let target = dir.path().join("head");
        std::fs::write(&source, b"0123456789").unwrap();
        std::fs::write(&target, b"abc").unwrap();

        assert_eq!(io().concat_files(&source, &target).await.unwrap(), 10);
        assert_eq!(std::fs::read(&target).unwrap(), b"abc0123456789");

        let fresh = dir.path().join("fresh");
        assert_eq!(io().concat_files(&source, &fresh).await.unwrap(), 10);
        assert_eq!(std::fs::read(&fresh).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_concat_onto_itself_doubles_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("self");
        std::fs::write(&path, b"xyz123").unwrap();

        assert_eq!(io().concat_files(&path, &path).await.unwrap(), 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"xyz123xyz123");
    }

    #[tokio::test]
    async fn test_concat_errors_leave_target() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("head");
        std::fs::write(&target, b"abc").unwrap();

        let err = io()
            .concat_files(&dir.path().join("missing"), &target)
            .await
            .unwrap_err();
        assert!(matches!(err, FileAccessError::NotFound { .. }));
        assert_eq!(std::fs::read(&target).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_restore_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grown");
        std::fs::write(&path, b"original+partial").unwrap();

        io().restore_length(&path, Some(8)).await;
        assert_eq!(std::fs::read(&path).unwrap(), b"original");

        io().restore_length(&path, None).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unlink() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        let tree = dir.path().join("t");
        std::fs::write(&file, b"x").unwrap();
        std::fs::create_dir_all(tree.join("sub")).unwrap();
        std::fs::write(tree.join("sub/g"), b"y").unwrap();

        io().unlink(&file).await.unwrap();
        io().unlink(&tree).await.unwrap();
        assert!(!file.exists());
        assert!(!tree.exists());

        assert!(matches!(
            io().unlink(&file).await,
            Err(FileAccessError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mkdir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        io().mkdir(&nested).await.unwrap();
        io().mkdir(&nested).await.unwrap();
        assert!(nested.is_dir());

        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            io().mkdir(&file).await,
            Err(FileAccessError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_ls() {
        let dir = TempDir::new().unwrap();
        assert!(io().ls(dir.path()).await.unwrap().is_empty());

        for name in ["b", "a", "c"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d")).unwrap();
        assert_eq!(io().ls(dir.path()).await.unwrap(), vec!["a", "b", "c", "d"]);

        assert!(matches!(
            io().ls(&dir.path().join("a")).await,
            Err(FileAccessError::NotADirectory { .. })
        ));
        assert!(matches!(
            io().ls(&dir.path().join("zz")).await,
            Err(FileAccessError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_exists_and_is_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();

        assert!(io().exists(&file).await);
        assert!(!io().is_dir(&file).await);
        assert!(io().exists(dir.path()).await);
        assert!(io().is_dir(dir.path()).await);
        assert!(!io().exists(&dir.path().join("nope")).await);
        assert!(!io().is_dir(&dir.path().join("nope")).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broken_symlink_reports_absent() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        assert!(!io().exists(&link).await);
        assert!(!io().is_dir(&link).await);
        // unlink still removes the link itself
        io().unlink(&link).await.unwrap();
        assert!(std::fs::symlink_metadata(&link).is_err());
    }

    #[tokio::test]
    async fn test_stat_and_stat_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"12345").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let stat = io().stat(&file).await.unwrap();
        assert_eq!(stat.size, 5);
        assert_eq!(stat.filename, "notes.txt");
        assert_eq!(stat.file_type, FileType::File);
        assert_eq!(stat.path, file);
        assert!(stat.last_modified > 0);

        let listing = io().stat_dir(dir.path()).await.unwrap();
        let names: Vec<_> = listing.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(names, vec!["notes.txt", "sub"]);
        assert!(listing[1].is_dir());

        assert!(matches!(
            io().stat(&dir.path().join("nope")).await,
            Err(FileAccessError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_pump_respects_limit() {
        let mut out = Vec::new();
        let copied = pump(
            &b"abcdefghij"[..],
            &mut out,
            3,
            Path::new("/in"),
            Path::new("/out"),
            7,
        )
        .await
        .unwrap();

        assert_eq!(copied, 7);
        assert_eq!(out, b"abcdefg");
    }

    #[tokio::test]
    async fn test_dropped_staged_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("never.txt");

        let staged = StagedFile::create(&target).await.unwrap();
        let temp = staged.temp_path().to_path_buf();
        assert!(temp.exists());
        drop(staged);

        for _ in 0..50 {
            if !temp.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!temp.exists());
        assert!(!target.exists());
    }
}
