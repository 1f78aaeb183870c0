use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::fmt::Debug;

mod config;
mod error;
pub mod memory;
pub mod mongo;
mod schools;

pub use config::DocumentStoreConfig;
pub use error::Error;
pub use schools::SchoolDirectory;

/// A collection of schema-less documents.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
    /// Insert a document, assigning it an `ObjectId` when it has no `_id`, and return its id
    async fn insert_one(&self, document: Document) -> Result<Bson, Error>;

    /// Find the documents matching `filter`; an empty filter matches every document
    ///
    /// A filter value matches a field holding an equal value, or an array containing it.
    async fn find(&self, filter: Document) -> Result<Vec<Document>, Error>;

    /// Set the fields of `changes` on every document matching `filter`
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` the number of documents actually modified
    /// * `Err(Error)` if the update could not be applied
    async fn update_many(&self, filter: Document, changes: Document) -> Result<u64, Error>;
}
