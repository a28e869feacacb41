pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

use std::sync::Arc;

use tracing::warn;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemorySigilStore, MemoryUserStore};
pub use repository::{SigilRepository, UserRepository};
pub use store::{SigilFilter, SigilStore, UserStore};

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

/// The pair of stores the API runs against
#[derive(Clone)]
pub struct Stores {
    pub backend: Backend,
    pub sigils: Arc<dyn SigilStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Connect to Postgres and apply migrations. Without a `DATABASE_URL`,
    /// falls back to memory when `allow_memory` is set and errors otherwise.
    pub async fn open(config: &DatabaseConfig, allow_memory: bool) -> Result<Self, DatabaseError> {
        if config.url.is_none() && allow_memory {
            warn!("DATABASE_URL not set; using the in-memory store, data will not persist");
            return Ok(Self::memory());
        }

        let pool = DatabaseManager::connect(config).await?;
        DatabaseManager::migrate(&pool).await?;

        Ok(Self {
            backend: Backend::Postgres,
            sigils: Arc::new(SigilRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool)),
        })
    }

    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            sigils: Arc::new(MemorySigilStore::new()),
            users: Arc::new(MemoryUserStore::new()),
        }
    }
}
