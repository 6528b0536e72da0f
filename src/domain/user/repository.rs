//! User repository

use super::entity::{PublicUser, User};
use crate::domain::shared::document::{FieldFilter, Projection, Record};
use crate::domain::shared::persistence::PersistenceError;
use crate::domain::shared::repository::{CrudRepository, DocumentCollection};
use std::sync::Arc;

/// Lookups that must never expose the password hash
const WITHOUT_PASSWORD: Projection = Projection::Exclude(&["password"]);

/// User repository: the generic CRUD set plus user-specific lookups
#[derive(Clone)]
pub struct UserRepository {
    base: CrudRepository<User>,
}

impl UserRepository {
    pub fn new(collection: Arc<dyn DocumentCollection<User>>) -> Self {
        Self {
            base: CrudRepository::new(collection),
        }
    }

    /// Generic create/get/update/delete operations
    pub fn crud(&self) -> &CrudRepository<User> {
        &self.base
    }

    /// Find user by email, credential included (used for sign-in)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Record<User>>, PersistenceError> {
        let doc = self
            .base
            .collection()
            .find_one(&FieldFilter::eq("email", email), Projection::All)
            .await?;

        Ok(doc.map(Record::from_document).transpose()?)
    }

    /// Find user by username, password projected out
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Record<PublicUser>>, PersistenceError> {
        let doc = self
            .base
            .collection()
            .find_one(&FieldFilter::eq("username", username), WITHOUT_PASSWORD)
            .await?;

        Ok(doc.map(Record::from_document).transpose()?)
    }
}
