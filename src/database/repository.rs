use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{LayoutType, LetterAssignment, SigilRecord, User};
use super::store::{SigilFilter, SigilStore, UserStore};

const SIGIL_COLUMNS: &str = r#"
    id, user_id, incantation, image, is_burned, created_at, burned_at,
    created_lat, created_long, burned_lat, burned_long,
    layout_type, vertex_count, letter_assignment
"#;

/// Row shape of the `sigils` table
#[derive(Debug, Clone, FromRow)]
struct SigilRow {
    id: Uuid,
    user_id: Uuid,
    incantation: String,
    image: String,
    is_burned: bool,
    created_at: DateTime<Utc>,
    burned_at: Option<DateTime<Utc>>,
    created_lat: Option<f64>,
    created_long: Option<f64>,
    burned_lat: Option<f64>,
    burned_long: Option<f64>,
    layout_type: String,
    vertex_count: i32,
    letter_assignment: Json<LetterAssignment>,
}

impl SigilRow {
    fn into_record(self) -> SigilRecord {
        SigilRecord {
            id: self.id,
            owner: self.user_id,
            incantation: self.incantation,
            image: self.image,
            is_burned: self.is_burned,
            created_at: self.created_at,
            burned_at: self.burned_at,
            created_lat: self.created_lat,
            created_long: self.created_long,
            burned_lat: self.burned_lat,
            burned_long: self.burned_long,
            layout_type: LayoutType::parse(&self.layout_type),
            vertex_count: self.vertex_count,
            letter_assignment: self.letter_assignment.0,
        }
    }
}

/// Postgres-backed sigil storage
#[derive(Debug, Clone)]
pub struct SigilRepository {
    pool: PgPool,
}

impl SigilRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SigilStore for SigilRepository {
    async fn insert(&self, record: SigilRecord) -> Result<SigilRecord, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO sigils (
                id, user_id, incantation, image, is_burned, created_at, burned_at,
                created_lat, created_long, burned_lat, burned_long,
                layout_type, vertex_count, letter_assignment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {SIGIL_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, SigilRow>(&sql)
            .bind(record.id)
            .bind(record.owner)
            .bind(&record.incantation)
            .bind(&record.image)
            .bind(record.is_burned)
            .bind(record.created_at)
            .bind(record.burned_at)
            .bind(record.created_lat)
            .bind(record.created_long)
            .bind(record.burned_lat)
            .bind(record.burned_long)
            .bind(record.layout_type.as_str())
            .bind(record.vertex_count)
            .bind(Json(&record.letter_assignment))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_record())
    }

    async fn list(&self, filter: &SigilFilter) -> Result<Vec<SigilRecord>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {SIGIL_COLUMNS}
            FROM sigils
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::boolean IS NULL OR is_burned = $2)
            ORDER BY created_at DESC, id
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, SigilRow>(&sql)
            .bind(filter.owner)
            .bind(filter.is_burned)
            .bind(filter.limit)
            .bind(filter.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SigilRow::into_record).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SigilRecord>, DatabaseError> {
        let sql = format!("SELECT {SIGIL_COLUMNS} FROM sigils WHERE id = $1");

        let row = sqlx::query_as::<_, SigilRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SigilRow::into_record))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// Postgres-backed user directory
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_active(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, is_active, created_at FROM users WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, is_active, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, username: &str) -> Result<User, DatabaseError> {
        if !User::is_valid_username(username) {
            return Err(DatabaseError::InvalidUsername(username.to_string()));
        }

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, is_active, created_at)
            VALUES ($1, $2, true, NOW())
            RETURNING id, username, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if DatabaseManager::is_unique_violation(&e) {
                DatabaseError::Conflict(format!("username '{}' is already taken", username))
            } else {
                DatabaseError::Sqlx(e)
            }
        })
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, is_active, created_at FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
