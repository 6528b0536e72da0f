//! In-memory document collection

use crate::domain::shared::document::{
    merge_patch, to_document, Document, DocumentId, FieldFilter, Model, Projection, Record,
};
use crate::domain::shared::persistence::PersistenceError;
use crate::domain::shared::repository::DocumentCollection;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::marker::PhantomData;
use tokio::sync::RwLock;
use tracing::debug;

/// Collection kept in process memory. Insertion order is the natural order.
pub struct MemoryCollection<T> {
    documents: RwLock<Vec<Document>>,
    _model: PhantomData<fn() -> T>,
}

impl<T: Model> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            _model: PhantomData,
        }
    }
}

impl<T: Model> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn id_of(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

/// First unique key of `T` that `candidate` shares with another document
fn check_unique<T: Model>(
    documents: &[Document],
    candidate: &Document,
    skip_id: Option<&str>,
) -> Result<(), PersistenceError> {
    for key in T::UNIQUE_KEYS {
        let Some(value) = candidate.get(*key).filter(|v| !v.is_null()) else {
            continue;
        };
        let taken = documents
            .iter()
            .filter(|doc| skip_id.is_none() || id_of(doc) != skip_id)
            .any(|doc| doc.get(*key) == Some(value));
        if taken {
            return Err(PersistenceError::duplicate_key(T::COLLECTION, key));
        }
    }
    Ok(())
}

#[async_trait]
impl<T: Model> DocumentCollection<T> for MemoryCollection<T> {
    async fn insert(&self, data: T) -> Result<Record<T>, PersistenceError> {
        data.validate()?;

        let record = Record::new(data);
        let doc = to_document(&record)?;

        let mut documents = self.documents.write().await;
        check_unique::<T>(&documents, &doc, None)?;
        documents.push(doc);

        debug!("Inserted document {} into {}", record.id, T::COLLECTION);
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<Record<T>>, PersistenceError> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .cloned()
            .map(|doc| Record::from_document(doc).map_err(PersistenceError::from))
            .collect()
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError> {
        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|doc| id_of(doc) == Some(id.as_str()))
            .cloned()
            .map(Record::from_document)
            .transpose()
            .map_err(PersistenceError::from)
    }

    async fn find_one(
        &self,
        filter: &FieldFilter,
        projection: Projection,
    ) -> Result<Option<Document>, PersistenceError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|doc| filter.matches(doc))
            .cloned()
            .map(|doc| projection.apply(doc)))
    }

    async fn update_by_id(
        &self,
        id: &DocumentId,
        patch: &T::Patch,
    ) -> Result<Option<Record<T>>, PersistenceError> {
        let patch = to_document(patch)?;

        let mut documents = self.documents.write().await;
        let Some(position) = documents
            .iter()
            .position(|doc| id_of(doc) == Some(id.as_str()))
        else {
            return Ok(None);
        };

        let merged = merge_patch(documents[position].clone(), patch);
        let mut record: Record<T> = Record::from_document(merged)?;
        record.data.validate()?;
        record.updated_at = Utc::now();

        let doc = to_document(&record)?;
        check_unique::<T>(&documents, &doc, Some(id.as_str()))?;
        documents[position] = doc;

        debug!("Updated document {} in {}", id, T::COLLECTION);
        Ok(Some(record))
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError> {
        let mut documents = self.documents.write().await;
        let Some(position) = documents
            .iter()
            .position(|doc| id_of(doc) == Some(id.as_str()))
        else {
            return Ok(None);
        };

        let removed = documents.remove(position);
        debug!("Deleted document {} from {}", id, T::COLLECTION);
        Ok(Some(Record::from_document(removed)?))
    }
}
