//! Stored documents and the model contract entities implement

use super::persistence::ModelValidationError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Raw JSON document as held by a storage adapter
pub type Document = Map<String, Value>;

/// Fields managed by the store; patches never touch them.
pub const RESERVED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// Document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted entity together with its store-managed fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: DocumentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    /// Wrap fresh data with a new id and timestamps
    pub fn new(data: T) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            created_at: now,
            updated_at: now,
            data,
        }
    }
}

impl<T: DeserializeOwned> Record<T> {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }
}

/// Serialize any struct-like value into a document
pub fn to_document<S: Serialize>(value: &S) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Apply a partial document on top of a stored one.
///
/// Only top-level keys present in `patch` are replaced; nulls and
/// store-managed fields are ignored.
pub fn merge_patch(mut doc: Document, patch: Document) -> Document {
    for (key, value) in patch {
        if value.is_null() || RESERVED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        doc.insert(key, value);
    }
    doc
}

/// Which fields a lookup returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    All,
    /// Drop the listed fields
    Exclude(&'static [&'static str]),
    /// Keep only the listed fields (plus the store-managed ones)
    Include(&'static [&'static str]),
}

impl Projection {
    pub fn apply(&self, doc: Document) -> Document {
        match self {
            Projection::All => doc,
            Projection::Exclude(fields) => doc
                .into_iter()
                .filter(|(key, _)| !fields.contains(&key.as_str()))
                .collect(),
            Projection::Include(fields) => doc
                .into_iter()
                .filter(|(key, _)| {
                    fields.contains(&key.as_str()) || RESERVED_FIELDS.contains(&key.as_str())
                })
                .collect(),
        }
    }
}

/// Equality match on a single top-level field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Contract between an entity type and the storage adapters
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial update payload; `None` fields must be skipped when serialized
    type Patch: Serialize + Send + Sync;

    /// Collection (table, bucket) the entity lives in
    const COLLECTION: &'static str;

    /// Fields with a uniqueness constraint, checked in this order
    const UNIQUE_KEYS: &'static [&'static str] = &[];

    /// Model-level schema checks run before every write
    fn validate(&self) -> Result<(), ModelValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
    }

    #[test]
    fn test_record_document_round_trip() {
        let record = Record::new(Note {
            title: "hello".to_string(),
        });
        let document = to_document(&record).unwrap();

        assert_eq!(document["title"], json!("hello"));
        assert_eq!(document["id"], json!(record.id.as_str()));

        let back: Record<Note> = Record::from_document(document).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_to_document_rejects_scalars() {
        assert!(to_document(&42).is_err());
    }

    #[test]
    fn test_merge_patch_only_touches_present_fields() {
        let stored = doc(json!({"id": "a", "username": "alice", "email": "a@x.io"}));
        let patch = doc(json!({"email": "new@x.io", "username": null, "id": "evil"}));

        let merged = merge_patch(stored, patch);
        assert_eq!(merged["id"], json!("a"));
        assert_eq!(merged["username"], json!("alice"));
        assert_eq!(merged["email"], json!("new@x.io"));
    }

    #[test]
    fn test_projection() {
        let stored = doc(json!({"id": "a", "username": "alice", "password": "hash"}));

        let hidden = Projection::Exclude(&["password"]).apply(stored.clone());
        assert!(hidden.get("password").is_none());
        assert_eq!(hidden["username"], json!("alice"));

        let only = Projection::Include(&["username"]).apply(stored.clone());
        assert_eq!(only.len(), 2);
        assert!(only.contains_key("id"));

        assert_eq!(Projection::All.apply(stored.clone()), stored);
    }

    #[test]
    fn test_field_filter() {
        let stored = doc(json!({"email": "a@x.io"}));
        assert!(FieldFilter::eq("email", "a@x.io").matches(&stored));
        assert!(!FieldFilter::eq("email", "b@x.io").matches(&stored));
        assert!(!FieldFilter::eq("username", "a@x.io").matches(&stored));
    }
}
