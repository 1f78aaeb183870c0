use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use serde::Deserialize;
use tracing::info;

use crate::document_store::{DocumentStore, Error};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default = "BackendConfig::default_database")]
    pub database: String,
    #[serde(default = "BackendConfig::default_collection")]
    pub collection: String,
}

impl BackendConfig {
    fn default_database() -> String {
        "logs".to_string()
    }

    fn default_collection() -> String {
        "school".to_string()
    }
}

#[derive(Debug)]
pub struct Backend {
    collection: Collection<Document>,
}

impl Backend {
    pub async fn new(config: &BackendConfig) -> Result<Self, Error> {
        info!(
            "Using MongoDB document store {}.{}",
            config.database, config.collection
        );
        let client = Client::with_uri_str(&config.url).await?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        Ok(Backend { collection })
    }
}

#[async_trait]
impl DocumentStore for Backend {
    async fn insert_one(&self, document: Document) -> Result<Bson, Error> {
        let result = self.collection.insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, Error> {
        let mut cursor = self.collection.find(filter).await?;
        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?);
        }
        Ok(documents)
    }

    async fn update_many(&self, filter: Document, changes: Document) -> Result<u64, Error> {
        let result = self
            .collection
            .update_many(filter, doc! { "$set": changes })
            .await?;
        Ok(result.modified_count)
    }
}
