//! Flat JSON file backend

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{PatientMap, PatientStore};
use crate::config::StorageBackend;
use crate::fs_util::write_atomic;
use crate::{Error, Result};

/// Store backed by one JSON object file, rewritten in full on every save
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seed an empty store so a fresh install can serve requests
    ///
    /// Returns true if a file was created.
    pub async fn create_if_missing(&self) -> Result<bool> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.save(&PatientMap::new()).await?;
        info!("Created empty patient store at {}", self.path.display());
        Ok(true)
    }
}

/// 4-space indented JSON
fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

#[async_trait]
impl PatientStore for JsonFileStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<PatientMap> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!(
                    "Patient data file not found: {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let patients: PatientMap = serde_json::from_str(&text)
            .map_err(|e| Error::Corruption(format!("{}: {}", self.path.display(), e)))?;
        debug!("Loaded {} patients from {}", patients.len(), self.path.display());
        Ok(patients)
    }

    async fn save(&self, patients: &PatientMap) -> Result<()> {
        let bytes = to_pretty_json(patients)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        write_atomic(&self.path, &bytes).await?;
        debug!("Saved {} patients to {}", patients.len(), self.path.display());
        Ok(())
    }
}
