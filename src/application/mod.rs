//! Application layer - Wiring storage, repositories and services together

use crate::config::{Config, StorageBackend};
use crate::domain::shared::repository::DocumentCollection;
use crate::domain::user::{User, UserRepository, UserService};
use crate::infrastructure::persistence::MemoryCollection;
use crate::interface::api::AppState;
use std::sync::Arc;
use tracing::info;

/// Build the shared application state for the configured storage backend
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let users: Arc<dyn DocumentCollection<User>> = match config.database.backend {
        StorageBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(MemoryCollection::<User>::new())
        }
        StorageBackend::Postgres => postgres_users(config).await?,
    };

    Ok(state_with(users, config.security.bcrypt_cost))
}

/// State over an existing user collection
pub fn state_with(users: Arc<dyn DocumentCollection<User>>, bcrypt_cost: u32) -> AppState {
    let repository = UserRepository::new(users);
    AppState {
        user_service: Arc::new(UserService::new(repository, bcrypt_cost)),
    }
}

#[cfg(feature = "postgres")]
async fn postgres_users(config: &Config) -> anyhow::Result<Arc<dyn DocumentCollection<User>>> {
    use crate::infrastructure::persistence::{create_pool, run_migrations, PgCollection, PoolConfig};

    info!("Initializing database connection...");
    let pool = create_pool(&PoolConfig::from(&config.database)).await?;

    run_migrations(&pool).await?;

    let users = PgCollection::<User>::new(pool);
    users.ensure_indexes().await?;
    info!("User collection initialized");

    Ok(Arc::new(users))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_users(_config: &Config) -> anyhow::Result<Arc<dyn DocumentCollection<User>>> {
    anyhow::bail!("database.backend = \"postgres\" requires the `postgres` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_state() {
        let config = Config::default();
        let state = build_state(&config).await.unwrap();
        assert!(state.user_service.list_users().await.unwrap().is_empty());
    }
}
