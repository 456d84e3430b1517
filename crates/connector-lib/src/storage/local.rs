use crate::error::{ConnectorError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Writes files into an existing local directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    path: PathBuf,
}

impl LocalFileStorage {
    /// Fails unless `path` exists and is a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| ConnectorError::storage(path.display().to_string(), e))?;
        if !metadata.is_dir() {
            return Err(ConnectorError::storage(
                path.display().to_string(),
                "path is not a directory",
            ));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        let location = self.path.join(name);
        fs::write(&location, content).await?;
        debug!(path = %location.display(), bytes = content.len(), "Wrote file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = LocalFileStorage::new(&missing).unwrap_err();
        assert!(matches!(err, ConnectorError::Storage { .. }));
    }

    #[test]
    fn test_regular_file_is_rejected() {
        let file = NamedTempFile::new().unwrap();

        let err = LocalFileStorage::new(file.path()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(dir.path()).unwrap();

        storage.write("ldif.json", b"first").await.unwrap();
        storage.write("ldif.json", b"second").await.unwrap();

        let content = std::fs::read(dir.path().join("ldif.json")).unwrap();
        assert_eq!(content, b"second");
    }
}
