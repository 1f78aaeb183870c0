use std::sync::Arc;

use serde::Deserialize;

use crate::kv_store;
use crate::kv_store::{Error, KeyValueStore};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub enum KeyValueStoreConfig {
    #[default]
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "redis")]
    Redis(kv_store::redis::BackendConfig),
}

impl KeyValueStoreConfig {
    pub fn to_backend(&self) -> Result<Arc<dyn KeyValueStore>, Error> {
        match self {
            KeyValueStoreConfig::Redis(config) => {
                Ok(Arc::new(kv_store::redis::Backend::new(config)?))
            }
            KeyValueStoreConfig::Memory => Ok(Arc::new(kv_store::memory::Backend::new())),
        }
    }
}
