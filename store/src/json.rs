//! JSON file store.
//!
//! The snapshot is a pretty-printed JSON array of account records. Writes go to
//! a sibling temporary file that is then renamed over the target, so readers
//! see either the previous snapshot or the new one.

use std::path::PathBuf;

use fanout_types::Batch;

use crate::{BatchStore, StoreError};

/// Serialize a batch to its canonical on-disk bytes.
pub fn encode_batch(batch: &Batch) -> Result<Vec<u8>, StoreError> {
    let mut bytes =
        serde_json::to_vec_pretty(batch).map_err(|e| StoreError::Serialization(e.to_string()))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse on-disk bytes back into a batch.
pub fn decode_batch(bytes: &[u8]) -> Result<Batch, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Corruption(e.to_string()))
}

/// Stores the batch snapshot as a JSON file at a fixed path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl BatchStore for JsonFileStore {
    fn save(&self, batch: &Batch) -> Result<(), StoreError> {
        let bytes = encode_batch(batch)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, &bytes).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), records = batch.len(), "batch checkpoint written");
        Ok(())
    }

    fn load(&self) -> Result<Batch, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.display().to_string()))
            }
            Err(e) => return Err(self.io_error(e)),
        };
        decode_batch(&bytes)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
