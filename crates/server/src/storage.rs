use std::io;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid file name {0:?}")]
    InvalidFileName(String),
    #[error("File {0:?} not found")]
    NotFound(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Publicly served area where signed files are written and from which
/// uploaded documents and CMS files to co-sign are read.
#[derive(Debug, Clone)]
pub struct AppDataStorage {
    root: PathBuf,
}

impl AppDataStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` under a fresh `<uuid>.<extension>` name, creating
    /// the storage directory if needed. Returns the file name.
    ///
    /// `extension` is at most 8 ASCII alphanumerics.
    pub async fn store(&self, content: &[u8], extension: &str) -> Result<String, StorageError> {
        if !is_plain_extension(extension) {
            return Err(StorageError::InvalidFileName(format!("*.{extension}")));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Io {
                path: self.root.clone(),
                source,
            })?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| StorageError::Io { path, source })?;

        tracing::info!(%file_name, bytes = content.len(), "stored file");
        Ok(file_name)
    }

    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(file_name)?;
        tokio::fs::read(&path).await.map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(file_name.to_string()),
            _ => StorageError::Io { path, source },
        })
    }

    fn resolve(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        if !is_plain_file_name(file_name) {
            return Err(StorageError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }
}

fn is_plain_extension(extension: &str) -> bool {
    (1..=8).contains(&extension.len()) && extension.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// A single normal path component, so joining it cannot leave the root.
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
