use serde::Deserialize;
use std::fs;
use std::path::Path;

mod error;

use crate::cache::CacheConfig;
use crate::document_store::DocumentStoreConfig;
use crate::kv_store::KeyValueStoreConfig;
use crate::web::{HttpConfig, PageCacheConfig};
pub use error::Error;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub key_value_store: KeyValueStoreConfig,
    #[serde(default)]
    pub document_store: DocumentStoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub page_cache: PageCacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub tracing: Option<TracingConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TracingConfig {
    pub endpoint: String,
    pub sampling_rate: f64,
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        let config: Configuration = toml::from_str(slice)?;

        if config.page_cache.expires_in == 0 {
            return Err(Error::InvalidValue(
                "page_cache.expires_in must be at least 1 second".to_string(),
            ));
        }

        Ok(config)
    }
}
