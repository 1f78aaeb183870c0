use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};
use uuid::Uuid;

use crate::instrumentation::{self, CallHistory, CountCalls, Method, MethodExt, Replay};
use crate::kv_store::{Error, KeyValueStore};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_flush_on_start")]
    pub flush_on_start: bool,
}

impl CacheConfig {
    fn default_flush_on_start() -> bool {
        true
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            flush_on_start: CacheConfig::default_flush_on_start(),
        }
    }
}

/// Scalar value accepted by [`Cache::store`].
#[derive(Clone, Debug, PartialEq)]
pub enum Data {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl Data {
    fn to_stored(&self) -> String {
        match self {
            Data::Text(text) => text.clone(),
            Data::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Data::Int(value) => value.to_string(),
            Data::Float(value) => format!("{value:?}"),
        }
    }
}

/// Call records hold the same text the store does, so bytes are recorded as a string.
impl Serialize for Data {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Data::Text(text) => serializer.serialize_str(text),
            Data::Bytes(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Data::Int(value) => serializer.serialize_i64(*value),
            Data::Float(value) => serializer.serialize_f64(*value),
        }
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::Text(value.to_string())
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::Text(value)
    }
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Data::Bytes(value)
    }
}

impl From<&[u8]> for Data {
    fn from(value: &[u8]) -> Self {
        Data::Bytes(value.to_vec())
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Data::Int(value)
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Float(value)
    }
}

struct StoreData {
    store: Arc<dyn KeyValueStore>,
}

#[async_trait]
impl Method for StoreData {
    type Input = (Data,);
    type Output = String;
    type Error = Error;

    fn qualified_name(&self) -> &str {
        Cache::STORE
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let key = Uuid::new_v4().to_string();
        self.store.set(&key, &input.0.to_stored()).await?;
        debug!("Stored data under key {key}");
        Ok(key)
    }
}

/// Stores scalar data under generated keys, counting and recording every `store` call.
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    store_data: CallHistory<CountCalls<StoreData>>,
}

impl Cache {
    pub const STORE: &'static str = "Cache.store";

    pub async fn new(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Result<Self, Error> {
        if config.flush_on_start {
            info!("Flushing key-value store");
            store.flush().await?;
        }

        let store_data = StoreData {
            store: store.clone(),
        }
        .count_calls(store.clone())
        .call_history(store.clone());

        Ok(Cache { store, store_data })
    }

    /// Store `data` under a fresh random key and return the key
    pub async fn store(&self, data: impl Into<Data>) -> Result<String, Error> {
        self.store_data.call((data.into(),)).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.store.get(key).await
    }

    /// Retrieve the value at `key` and convert it with `convert`
    pub async fn get_with<T, F>(&self, key: &str, convert: F) -> Result<Option<T>, Error>
    where
        F: FnOnce(String) -> T + Send,
    {
        Ok(self.get(key).await?.map(convert))
    }

    pub async fn get_str(&self, key: &str) -> Result<Option<String>, Error> {
        self.get_with(key, |value| value).await
    }

    pub async fn get_int(&self, key: &str) -> Result<Option<i64>, Error> {
        self.get_with(key, |value| value.trim().parse::<i64>())
            .await?
            .transpose()
            .map_err(|e| Error::Execution(format!("Value of key {key} is not an integer: {e}")))
    }

    /// Counter and call records of `Cache.store`
    pub async fn replay(&self) -> Result<Replay, Error> {
        instrumentation::replay(self.store.as_ref(), Cache::STORE).await
    }
}
