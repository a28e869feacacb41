//! Process-local stores for running without Postgres. Data is lost on exit.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{SigilRecord, User};
use super::store::{SigilFilter, SigilStore, UserStore};

#[derive(Debug, Default)]
pub struct MemorySigilStore {
    records: RwLock<Vec<SigilRecord>>,
}

impl MemorySigilStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SigilStore for MemorySigilStore {
    async fn insert(&self, record: SigilRecord) -> Result<SigilRecord, DatabaseError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(DatabaseError::Conflict(format!("sigil {} already exists", record.id)));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn list(&self, filter: &SigilFilter) -> Result<Vec<SigilRecord>, DatabaseError> {
        let records = self.records.read().await;

        let mut matching: Vec<SigilRecord> = records
            .iter()
            .filter(|r| filter.owner.map_or(true, |owner| r.owner == owner))
            .filter(|r| filter.is_burned.map_or(true, |burned| r.is_burned == burned))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SigilRecord>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a user's active flag; returns false if the user doesn't exist
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_active(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id && u.is_active).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str) -> Result<User, DatabaseError> {
        if !User::is_valid_username(username) {
            return Err(DatabaseError::InvalidUsername(username.to_string()));
        }

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(DatabaseError::Conflict(format!("username '{}' is already taken", username)));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
