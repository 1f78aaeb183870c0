use std::sync::Arc;

use serde::Deserialize;

use crate::document_store;
use crate::document_store::{DocumentStore, Error};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub enum DocumentStoreConfig {
    #[default]
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "mongodb")]
    MongoDb(document_store::mongo::BackendConfig),
}

impl DocumentStoreConfig {
    pub async fn to_backend(&self) -> Result<Arc<dyn DocumentStore>, Error> {
        match self {
            DocumentStoreConfig::MongoDb(config) => {
                Ok(Arc::new(document_store::mongo::Backend::new(config).await?))
            }
            DocumentStoreConfig::Memory => Ok(Arc::new(document_store::memory::Backend::new())),
        }
    }
}
