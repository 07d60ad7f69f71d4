//! Repository implementations: on-disk JSON record and an in-memory fake.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::fs;

use super::{CartRepository, StorageError};

/// Stores the cart as a single JSON record inside a data directory: the
/// device-local equivalent of one key-value entry under the `"cart"` key.
#[derive(Clone, Debug)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { path: data_dir.as_ref().join("cart.json") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartRepository for FileRepository {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, payload: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

/// In-memory record, for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    record: Arc<Mutex<Option<String>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository pre-populated with a raw record, valid or not.
    pub fn seeded(raw: &str) -> Self {
        Self { record: Arc::new(Mutex::new(Some(raw.to_string()))) }
    }

    /// The current persisted record, if any.
    pub fn record(&self) -> Option<String> {
        self.record.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl CartRepository for MemoryRepository {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.record.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    async fn save(&self, payload: &str) -> Result<(), StorageError> {
        *self.record.lock().unwrap_or_else(|p| p.into_inner()) = Some(payload.to_string());
        Ok(())
    }
}
