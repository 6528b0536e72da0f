//! User service: signup, sign-in and account management

use super::entity::{PublicUser, User, UserPatch};
use super::repository::UserRepository;
use crate::domain::shared::document::{DocumentId, Record};
use crate::domain::shared::error::AppError;
use crate::domain::shared::result::Result;
use anyhow::Context;
use tracing::info;

/// Signup data
#[derive(Debug, Clone)]
pub struct SignupData {
    pub username: String,
    pub email: String,
    /// Plain text password (will be hashed)
    pub password: String,
}

pub struct UserService {
    repository: UserRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repository: UserRepository, bcrypt_cost: u32) -> Self {
        Self {
            repository,
            bcrypt_cost,
        }
    }

    /// Create a new account. Duplicate usernames or emails surface as
    /// duplicate-key failures from the store.
    pub async fn signup(&self, data: SignupData) -> Result<Record<User>> {
        info!("Signing up user {}", data.username);

        let password = hash_password(data.password, self.bcrypt_cost).await?;
        let user = self
            .repository
            .crud()
            .create(User {
                username: data.username,
                email: data.email,
                password,
            })
            .await?;

        info!("Created user {} (ID: {})", user.data.username, user.id);
        Ok(user)
    }

    /// Verify credentials
    pub async fn signin(&self, email: &str, password: &str) -> Result<Record<User>> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password.to_string(), user.data.password.clone()).await? {
            return Err(invalid_credentials().into());
        }

        info!("User {} signed in", user.id);
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<Record<User>>> {
        Ok(self.repository.crud().get_all().await?)
    }

    pub async fn get_user(&self, id: &DocumentId) -> Result<Record<User>> {
        Ok(self
            .repository
            .crud()
            .get_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Record<PublicUser>> {
        Ok(self
            .repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {} not found", username)))?)
    }

    pub async fn update_user(&self, id: &DocumentId, mut patch: UserPatch) -> Result<Record<User>> {
        if let Some(password) = patch.password.take() {
            patch.password = Some(hash_password(password, self.bcrypt_cost).await?);
        }

        let user = self
            .repository
            .crud()
            .update(id, &patch)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        info!("Updated user {} (ID: {})", user.data.username, user.id);
        Ok(user)
    }

    pub async fn delete_user(&self, id: &DocumentId) -> Result<Record<User>> {
        let user = self
            .repository
            .crud()
            .delete(id)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        info!("Deleted user {} (ID: {})", user.data.username, user.id);
        Ok(user)
    }
}

fn user_not_found(id: &DocumentId) -> AppError {
    AppError::not_found(format!("User {} not found", id))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials")
}

/// bcrypt is CPU bound; keep it off the async workers
async fn hash_password(password: String, cost: u32) -> Result<String> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")?;
    Ok(hashed)
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("password verification task failed")?
        .context("failed to verify password")?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::document::{to_document, Document, FieldFilter, Projection};
    use crate::domain::shared::failure::Failure;
    use crate::domain::shared::persistence::PersistenceError;
    use crate::domain::shared::repository::DocumentCollection;
    use async_trait::async_trait;
    use mockall::mock;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    const TEST_COST: u32 = 4;

    mock! {
        pub Users {}

        #[async_trait]
        impl DocumentCollection<User> for Users {
            async fn insert(&self, data: User) -> std::result::Result<Record<User>, PersistenceError>;
            async fn find_all(&self) -> std::result::Result<Vec<Record<User>>, PersistenceError>;
            async fn find_by_id(&self, id: &DocumentId) -> std::result::Result<Option<Record<User>>, PersistenceError>;
            async fn find_one(
                &self,
                filter: &FieldFilter,
                projection: Projection,
            ) -> std::result::Result<Option<Document>, PersistenceError>;
            async fn update_by_id(
                &self,
                id: &DocumentId,
                patch: &UserPatch,
            ) -> std::result::Result<Option<Record<User>>, PersistenceError>;
            async fn delete_by_id(&self, id: &DocumentId) -> std::result::Result<Option<Record<User>>, PersistenceError>;
        }
    }

    fn service(users: MockUsers) -> UserService {
        UserService::new(UserRepository::new(Arc::new(users)), TEST_COST)
    }

    fn signup_data() -> SignupData {
        SignupData {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_stores_hashed_password() {
        let mut users = MockUsers::new();
        users
            .expect_insert()
            .withf(|user| {
                user.password != "correct horse"
                    && bcrypt::verify("correct horse", &user.password).unwrap_or(false)
            })
            .times(1)
            .returning(|user| Ok(Record::new(user)));

        let created = assert_ok!(service(users).signup(signup_data()).await);
        assert_eq!(created.data.username, "alice");
    }

    #[tokio::test]
    async fn test_signup_propagates_duplicate_key() {
        let mut users = MockUsers::new();
        users
            .expect_insert()
            .returning(|_| Err(PersistenceError::duplicate_key("users", "email")));

        let err = assert_err!(service(users).signup(signup_data()).await);
        assert!(matches!(
            err,
            Failure::Persistence(PersistenceError::DuplicateKey { ref key_pattern, .. })
                if key_pattern == &vec!["email".to_string()]
        ));
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let mut users = MockUsers::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let err = assert_err!(service(users).get_user(&DocumentId::from("nope")).await);
        match err {
            Failure::Domain(app) => {
                assert_eq!(app.status(), 404);
                assert_eq!(app.name(), "NotFoundError");
            }
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signin_rejects_unknown_email() {
        let mut users = MockUsers::new();
        users.expect_find_one().returning(|_, _| Ok(None));

        let err = assert_err!(service(users).signin("ghost@example.com", "whatever").await);
        assert!(matches!(err, Failure::Domain(ref app) if app.status() == 401));
    }

    #[tokio::test]
    async fn test_signin_checks_password() {
        let hash = bcrypt::hash("correct horse", TEST_COST).unwrap();
        let stored = to_document(&Record::new(User {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: hash,
        }))
        .unwrap();

        let mut users = MockUsers::new();
        users
            .expect_find_one()
            .withf(|filter, projection| {
                filter.field == "email" && *projection == Projection::All
            })
            .returning(move |_, _| Ok(Some(stored.clone())));
        let service = service(users);

        let err = assert_err!(service.signin("alice@example.com", "battery staple").await);
        assert!(matches!(err, Failure::Domain(ref app) if app.message() == "Invalid credentials"));

        let user = assert_ok!(service.signin("alice@example.com", "correct horse").await);
        assert_eq!(user.data.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_rehashes_password() {
        let mut users = MockUsers::new();
        users
            .expect_update_by_id()
            .withf(|_, patch| {
                patch
                    .password
                    .as_deref()
                    .map(|hash| bcrypt::verify("new secret", hash).unwrap_or(false))
                    .unwrap_or(false)
            })
            .returning(|_, patch| {
                Ok(Some(Record::new(User {
                    username: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                    password: patch.password.clone().unwrap_or_default(),
                })))
            });

        let patch = UserPatch {
            password: Some("new secret".to_string()),
            ..Default::default()
        };
        assert_ok!(service(users).update_user(&DocumentId::new(), patch).await);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let mut users = MockUsers::new();
        users.expect_delete_by_id().returning(|_| Ok(None));

        let err = assert_err!(service(users).delete_user(&DocumentId::new()).await);
        assert!(matches!(err, Failure::Domain(ref app) if app.status() == 404));
    }
}
