//! Key-value blob store
//!
//! The persistence capability shared by the application and the widget
//! renderer. Values are opaque bytes; the JSON helpers below are how every
//! caller in this crate actually reads and writes them.

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[async_trait]
pub trait Store: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value; readers never observe a partial write
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and decode a JSON value
pub async fn read_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub async fn write_json<T: Serialize + ?Sized>(store: &dyn Store, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    store.set(key, &bytes).await
}
