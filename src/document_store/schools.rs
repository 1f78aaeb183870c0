use std::sync::Arc;

use mongodb::bson::{doc, Bson, Document};
use tracing::{debug, instrument};

use crate::document_store::{DocumentStore, Error};

/// School documents: `{ "name": ..., "topics": [...] }` plus any extra fields.
#[derive(Clone, Debug)]
pub struct SchoolDirectory {
    store: Arc<dyn DocumentStore>,
}

impl SchoolDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<Document>, Error> {
        self.store.find(Document::new()).await
    }

    #[instrument(skip(self))]
    pub async fn insert_school(&self, fields: Document) -> Result<Bson, Error> {
        let id = self.store.insert_one(fields).await?;
        debug!("Inserted school {id}");
        Ok(id)
    }

    /// Replace the topics of every school named `name`
    #[instrument(skip(self))]
    pub async fn update_topics(&self, name: &str, topics: &[String]) -> Result<u64, Error> {
        let modified = self
            .store
            .update_many(doc! { "name": name }, doc! { "topics": topics.to_vec() })
            .await?;
        debug!("Updated topics of {modified} schools");
        Ok(modified)
    }

    pub async fn schools_by_topic(&self, topic: &str) -> Result<Vec<Document>, Error> {
        self.store.find(doc! { "topics": topic }).await
    }
}
