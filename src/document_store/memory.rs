use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;
use tracing::info;

use crate::document_store::{DocumentStore, Error};

#[derive(Debug)]
pub struct Backend {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend {
    pub fn new() -> Self {
        info!("Using in-memory document store");
        Backend {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(field, expected)| match document.get(field) {
        Some(value) => {
            value == expected
                || matches!(value, Bson::Array(values) if values.contains(expected))
        }
        None => *expected == Bson::Null,
    })
}

#[async_trait]
impl DocumentStore for Backend {
    async fn insert_one(&self, document: Document) -> Result<Bson, Error> {
        let (id, document) = match document.get("_id") {
            Some(id) => (id.clone(), document),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                let mut with_id = Document::new();
                with_id.insert("_id", id.clone());
                for (field, value) in document {
                    with_id.insert(field, value);
                }
                (id, with_id)
            }
        };

        let mut documents = self.documents.write().await;
        if documents.iter().any(|existing| existing.get("_id") == Some(&id)) {
            return Err(Error::Backend(format!("Duplicate _id {id}")));
        }
        documents.push(document);
        Ok(id)
    }

    async fn find(&self, filter: Document) -> Result<Vec<Document>, Error> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|document| matches(document, &filter))
            .cloned()
            .collect())
    }

    async fn update_many(&self, filter: Document, changes: Document) -> Result<u64, Error> {
        let mut documents = self.documents.write().await;
        let mut modified = 0;

        for document in documents.iter_mut().filter(|document| matches(document, &filter)) {
            let mut changed = false;
            for (field, value) in &changes {
                if document.get(field) != Some(value) {
                    document.insert(field.clone(), value.clone());
                    changed = true;
                }
            }
            if changed {
                modified += 1;
            }
        }

        Ok(modified)
    }
}
