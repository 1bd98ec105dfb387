use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::error::{StorageError, StorageResult};

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Create `path` and any missing ancestors.
///
/// Existing directories are left untouched, so calling this repeatedly is safe.
/// A non-directory already occupying `path` is an error.
pub async fn ensure_dir(path: impl AsRef<Path>) -> StorageResult<()> {
    let path = path.as_ref();

    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(StorageError::CreateDirFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "path is not a directory"),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(StorageError::CreateDirFailed {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    builder
        .create(path)
        .await
        .map_err(|e| StorageError::CreateDirFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(path = %path.display(), "Created directory");
    Ok(())
}

/// A local directory that uploaded parts are written into
#[derive(Clone, Debug)]
pub struct LocalDirectory {
    base_path: PathBuf,
}

impl LocalDirectory {
    /// Open `base_path`, creating it when missing
    pub async fn open(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        ensure_dir(&base_path).await?;
        Ok(Self { base_path })
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    /// Create (or truncate) `file_name` and copy `reader` into it until EOF.
    ///
    /// Returns the number of bytes written.
    pub async fn write_from_reader<R>(&self, file_name: &str, reader: &mut R) -> StorageResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.file_path(file_name);
        let start = Instant::now();

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::CreateFileFailed {
                path: path.clone(),
                source: e,
            })?;

        let written = tokio::io::copy(reader, &mut file)
            .await
            .map_err(|e| StorageError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;

        file.flush().await.map_err(|e| StorageError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local file write successful"
        );

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b").join("c");

        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("uploads");
        ensure_dir(&dir).await.unwrap();
        std::fs::write(dir.join("keep.txt"), b"keep me").unwrap();

        ensure_dir(&dir).await.unwrap();
        ensure_dir(&dir).await.unwrap();

        assert_eq!(std::fs::read(dir.join("keep.txt")).unwrap(), b"keep me");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_dir_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("moded");
        ensure_dir(&dir).await.unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        // umask can only clear bits
        assert_eq!(mode & !0o755, 0);
    }

    #[tokio::test]
    async fn test_ensure_dir_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        let err = ensure_dir(&file).await.unwrap_err();
        assert!(matches!(err, StorageError::CreateDirFailed { .. }));
    }

    #[tokio::test]
    async fn test_write_from_reader() {
        let temp = TempDir::new().unwrap();
        let dir = LocalDirectory::open(temp.path().join("out")).await.unwrap();

        let mut reader: &[u8] = b"hello satchel";
        let written = dir.write_from_reader("hello.txt", &mut reader).await.unwrap();

        assert_eq!(written, 13);
        assert_eq!(
            std::fs::read(dir.file_path("hello.txt")).unwrap(),
            b"hello satchel"
        );
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let dir = LocalDirectory::open(temp.path().join("gone")).await.unwrap();
        std::fs::remove_dir(dir.path()).unwrap();

        let mut reader: &[u8] = b"data";
        let err = dir
            .write_from_reader("x.bin", &mut reader)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::CreateFileFailed { .. }));
    }
}
