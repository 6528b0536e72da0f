//! PostgreSQL document collection (JSONB)

use crate::domain::shared::document::{
    merge_patch, to_document, Document, DocumentId, FieldFilter, Model, Projection, Record,
};
use crate::domain::shared::persistence::PersistenceError;
use crate::domain::shared::repository::DocumentCollection;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use std::marker::PhantomData;
use tracing::{debug, error, info};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// All collections share the `documents` table, partitioned by name.
pub struct PgCollection<T> {
    pool: PgPool,
    _model: PhantomData<fn() -> T>,
}

impl<T: Model> PgCollection<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _model: PhantomData,
        }
    }

    /// Create one partial unique index per `T::UNIQUE_KEYS` entry
    pub async fn ensure_indexes(&self) -> Result<(), PersistenceError> {
        for key in T::UNIQUE_KEYS {
            let sql = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON documents ((body ->> '{key}')) \
                 WHERE collection = '{collection}'",
                index = index_name(T::COLLECTION, key),
                key = key,
                collection = T::COLLECTION,
            );
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(backend_error)?;
            info!("Ensured unique index on {}.{}", T::COLLECTION, key);
        }
        Ok(())
    }
}

fn index_name(collection: &str, key: &str) -> String {
    format!("{}_{}_1", collection, key)
}

fn backend_error(err: sqlx::Error) -> PersistenceError {
    error!("Database error: {}", err);
    PersistenceError::Backend(format!("Database error: {}", err))
}

/// Translate unique violations on our indexes into duplicate-key failures
fn write_error<T: Model>(err: sqlx::Error) -> PersistenceError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let key = db.constraint().and_then(|constraint| {
                T::UNIQUE_KEYS
                    .iter()
                    .find(|key| index_name(T::COLLECTION, key) == constraint)
            });
            if let Some(key) = key {
                return PersistenceError::duplicate_key(T::COLLECTION, key);
            }
        }
    }
    backend_error(err)
}

fn into_document(value: Value) -> Result<Document, PersistenceError> {
    match value {
        Value::Object(doc) => Ok(doc),
        _ => Err(PersistenceError::Backend(
            "stored body is not a JSON object".to_string(),
        )),
    }
}

fn into_record<T: Model>(value: Value) -> Result<Record<T>, PersistenceError> {
    Ok(Record::from_document(into_document(value)?)?)
}

#[async_trait]
impl<T: Model> DocumentCollection<T> for PgCollection<T> {
    async fn insert(&self, data: T) -> Result<Record<T>, PersistenceError> {
        data.validate()?;

        let record = Record::new(data);
        let doc = to_document(&record)?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(T::COLLECTION)
            .bind(record.id.as_str())
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await
            .map_err(write_error::<T>)?;

        debug!("Inserted document {} into {}", record.id, T::COLLECTION);
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<Record<T>>, PersistenceError> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY seq",
        )
        .bind(T::COLLECTION)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.into_iter().map(|Json(body)| into_record(body)).collect()
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(T::COLLECTION)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.map(|Json(body)| into_record(body)).transpose()
    }

    async fn find_one(
        &self,
        filter: &FieldFilter,
        projection: Projection,
    ) -> Result<Option<Document>, PersistenceError> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND body -> $2 = $3 \
             ORDER BY seq LIMIT 1",
        )
        .bind(T::COLLECTION)
        .bind(filter.field.as_str())
        .bind(Json(filter.value.clone()))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.map(|Json(body)| into_document(body).map(|doc| projection.apply(doc)))
            .transpose()
    }

    async fn update_by_id(
        &self,
        id: &DocumentId,
        patch: &T::Patch,
    ) -> Result<Option<Record<T>>, PersistenceError> {
        let patch = to_document(patch)?;

        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        let row = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(T::COLLECTION)
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend_error)?;

        let Some(Json(body)) = row else {
            return Ok(None);
        };

        let merged = merge_patch(into_document(body)?, patch);
        let mut record: Record<T> = Record::from_document(merged)?;
        record.data.validate()?;
        record.updated_at = Utc::now();
        let doc = to_document(&record)?;

        sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(T::COLLECTION)
            .bind(id.as_str())
            .bind(Json(Value::Object(doc)))
            .execute(&mut *tx)
            .await
            .map_err(write_error::<T>)?;

        tx.commit().await.map_err(backend_error)?;

        debug!("Updated document {} in {}", id, T::COLLECTION);
        Ok(Some(record))
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<Option<Record<T>>, PersistenceError> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING body",
        )
        .bind(T::COLLECTION)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        if row.is_some() {
            debug!("Deleted document {} from {}", id, T::COLLECTION);
        }
        row.map(|Json(body)| into_record(body)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_name_matches_key_pattern_style() {
        assert_eq!(index_name("users", "email"), "users_email_1");
    }

    #[test]
    fn test_into_document_rejects_non_objects() {
        assert!(into_document(serde_json::json!([1, 2])).is_err());
        assert!(into_document(serde_json::json!({"a": 1})).is_ok());
    }
}
