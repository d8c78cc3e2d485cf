//! Persistence for distribution batches.
//!
//! Every checkpoint replaces the stored snapshot wholesale. The rest of the
//! workspace depends only on the [`BatchStore`] trait; the JSON file store is
//! the production backend and `fanout-nullables` provides an in-memory one.

pub mod error;
pub mod json;

pub use error::StoreError;
pub use json::{decode_batch, encode_batch, JsonFileStore};

use fanout_types::Batch;

/// Trait for batch snapshot storage.
pub trait BatchStore: Send + Sync {
    /// Replace the stored snapshot with `batch`.
    fn save(&self, batch: &Batch) -> Result<(), StoreError>;

    /// Read the stored snapshot.
    fn load(&self) -> Result<Batch, StoreError>;

    /// Human-readable location of the snapshot, for operator messages.
    fn location(&self) -> String;
}
