use async_trait::async_trait;
use std::fmt::Debug;

mod config;
mod error;
pub mod memory;
pub mod redis;
pub mod serializing;

pub use config::KeyValueStoreConfig;
pub use error::Error;

/// Operations the instrumentation, cache and memoizer layers need from a key-value store.
///
/// Atomicity of `incr` and `push` is the backend's responsibility.
#[async_trait]
pub trait KeyValueStore: Debug + Send + Sync {
    /// Retrieve a string value
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` if the key holds a live value
    /// * `Ok(None)` if the key is missing or expired
    /// * `Err(Error)` if the value could not be retrieved
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store a string value without expiration, clearing any previous expiry
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Store a string value that expires after `expires_in` seconds
    async fn set_ex(&self, key: &str, value: &str, expires_in: u64) -> Result<(), Error>;

    /// Increment the integer stored at `key` by one, starting from zero, and return the new value
    async fn incr(&self, key: &str) -> Result<i64, Error>;

    /// Append `value` at the tail of the list stored at `key` and return the new length
    async fn push(&self, key: &str, value: &str) -> Result<u64, Error>;

    /// Read the whole list stored at `key` in insertion order
    async fn range(&self, key: &str) -> Result<Vec<String>, Error>;

    /// Remove every key owned by this store
    async fn flush(&self) -> Result<(), Error>;
}
