//! Patient store backends
//!
//! A store only knows how to load the complete id -> fields mapping and how to
//! replace it. The CRUD semantics on top live in [`crate::service`].

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::StorageBackend;
use crate::Result;

mod json_file;
mod map;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use json_file::JsonFileStore;
pub use map::PatientMap;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

/// Whole-content persistence for patient records
#[async_trait]
pub trait PatientStore: Send + Sync {
    fn backend(&self) -> StorageBackend;

    /// Human-readable location for logs
    fn location(&self) -> String;

    /// Fails with `NotFound` if the backing storage is absent and
    /// `Corruption` if its content is not well-formed
    async fn load(&self) -> Result<PatientMap>;

    /// Replace the stored content atomically
    async fn save(&self, patients: &PatientMap) -> Result<()>;
}

/// Open the configured backend, creating empty storage on first run
pub async fn open_store(backend: StorageBackend, path: &Path) -> Result<Arc<dyn PatientStore>> {
    match backend {
        StorageBackend::Json => {
            let store = JsonFileStore::new(path);
            store.create_if_missing().await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "sqlx")]
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::open(path).await?)),
        #[cfg(not(feature = "sqlx"))]
        StorageBackend::Sqlite => Err(crate::Error::Config(
            "sqlite backend requires the `sqlx` feature".to_string(),
        )),
    }
}
