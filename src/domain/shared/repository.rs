//! Generic repository over a persistable collection

use super::document::{Document, DocumentId, FieldFilter, Model, Projection, Record};
use super::persistence::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;

/// A persistable collection of `T`, implemented by storage adapters.
///
/// Writes validate the model and enforce `T::UNIQUE_KEYS`; the resulting
/// validation and duplicate-key failures are returned untouched.
#[async_trait]
pub trait DocumentCollection<T: Model>: Send + Sync {
    /// Insert a new document
    async fn insert(&self, data: T) -> Result<Record<T>, PersistenceError>;

    /// All documents in the store's natural order
    async fn find_all(&self) -> Result<Vec<Record<T>>, PersistenceError>;

    /// Find a document by ID
    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError>;

    /// First document matching `filter`, shaped by `projection`
    async fn find_one(
        &self,
        filter: &FieldFilter,
        projection: Projection,
    ) -> Result<Option<Document>, PersistenceError>;

    /// Apply a partial update and return the post-update document
    async fn update_by_id(
        &self,
        id: &DocumentId,
        patch: &T::Patch,
    ) -> Result<Option<Record<T>>, PersistenceError>;

    /// Remove a document and return what was removed
    async fn delete_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError>;
}

/// Uniform CRUD operations for one entity type.
///
/// Holds no per-call state; build one per entity at startup and share it.
pub struct CrudRepository<T: Model> {
    collection: Arc<dyn DocumentCollection<T>>,
}

impl<T: Model> Clone for CrudRepository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
        }
    }
}

impl<T: Model> CrudRepository<T> {
    pub fn new(collection: Arc<dyn DocumentCollection<T>>) -> Self {
        Self { collection }
    }

    pub async fn create(&self, data: T) -> Result<Record<T>, PersistenceError> {
        self.collection.insert(data).await
    }

    pub async fn get_all(&self) -> Result<Vec<Record<T>>, PersistenceError> {
        self.collection.find_all().await
    }

    pub async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError> {
        self.collection.find_by_id(id).await
    }

    pub async fn update(
        &self,
        id: &DocumentId,
        patch: &T::Patch,
    ) -> Result<Option<Record<T>>, PersistenceError> {
        self.collection.update_by_id(id, patch).await
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError> {
        self.collection.delete_by_id(id).await
    }

    /// Underlying collection, for entity-specific lookups
    pub fn collection(&self) -> &Arc<dyn DocumentCollection<T>> {
        &self.collection
    }
}
