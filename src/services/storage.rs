use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Directory (under the media root) holding uploaded input CSVs.
pub const UPLOAD_DIR: &str = "uploads";
/// Directory holding generated output reports.
pub const OUTPUT_DIR: &str = "outputs";
/// Directory holding images re-encoded by the worker.
pub const PROCESSED_DIR: &str = "processed";

/// Storage path for an uploaded CSV, keyed by request id.
pub fn upload_path(request_id: Uuid) -> String {
    format!("{UPLOAD_DIR}/{request_id}.csv")
}

/// Storage path for the output report of a request.
pub fn output_path(request_id: Uuid) -> String {
    format!("{OUTPUT_DIR}/{request_id}_output.csv")
}

/// Storage path for one processed image.
pub fn processed_image_path(request_id: Uuid, sequence_id: i64) -> String {
    format!("{PROCESSED_DIR}/{request_id}/{sequence_id}.jpg")
}

/// Local media storage: files under a root directory, served publicly under a
/// base URL.
///
/// All paths handed to this type are relative, `/`-separated and may not
/// escape the root.
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Result<Self, StorageError> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(StorageError::Config("media base URL is empty".to_string()));
        }

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            root: root.into(),
            base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a relative storage path to a filesystem path under the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let candidate = Path::new(relative);
        let is_clean = !relative.is_empty()
            && candidate
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !is_clean {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }

        Ok(self.root.join(candidate))
    }

    /// Create a directory (and parents) under the root. Idempotent.
    pub async fn ensure_dir(&self, relative_dir: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.resolve(relative_dir)?).await?;
        Ok(())
    }

    /// Open a file for writing, truncating any previous content.
    pub async fn create(&self, relative: &str) -> Result<fs::File, StorageError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(fs::File::create(path).await?)
    }

    pub async fn write(&self, relative: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut file = self.create(relative).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn read(&self, relative: &str) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(self.resolve(relative)?).await?)
    }

    pub async fn remove(&self, relative: &str) -> Result<(), StorageError> {
        fs::remove_file(self.resolve(relative)?).await?;
        Ok(())
    }

    /// Public URL of a stored path.
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative.trim_start_matches('/'))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path escapes media root: {0}")]
    InvalidPath(String),

    #[error("Storage configuration error: {0}")]
    Config(String),
}
