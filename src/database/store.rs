use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{SigilRecord, User};

/// Selection applied when listing sigils. Empty filter means every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SigilFilter {
    pub owner: Option<Uuid>,
    pub is_burned: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Persistence for sigil records. Records are inserted once and never
/// updated or deleted through this interface.
#[async_trait]
pub trait SigilStore: Send + Sync {
    /// Persist a fully-built record and return it as stored
    async fn insert(&self, record: SigilRecord) -> Result<SigilRecord, DatabaseError>;

    /// Records matching `filter`, newest first
    async fn list(&self, filter: &SigilFilter) -> Result<Vec<SigilRecord>, DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<SigilRecord>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Users the bearer tokens are issued for
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Active user with this id, if any
    async fn find_active(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Create an active user. Fails with `DatabaseError::Conflict` on a taken name.
    async fn create(&self, username: &str) -> Result<User, DatabaseError>;

    async fn list(&self) -> Result<Vec<User>, DatabaseError>;
}
