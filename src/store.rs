//! Synchronous key-value persistence.
//!
//! `KeyValueStore` is the minimal contract the playback core relies on. The
//! typed layer in `persist` sits on top of it and never lets a storage or
//! decoding failure escape: writes are best-effort and corrupt values fall
//! back to defaults.

mod json;
mod memory;
mod persist;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use persist::{Persistence, StoreKey};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process-local key-value storage that survives restarts.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests;
