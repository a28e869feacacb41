use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{LayoutType, LetterAssignment, SigilRecord};
use crate::storage::MediaStorage;

/// Public wire format of a sigil. `image` is an absolute URL.
#[derive(Debug, Clone, Serialize)]
pub struct SigilResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub incantation: String,
    pub image: String,
    pub is_burned: bool,
    pub created_at: DateTime<Utc>,
    pub burned_at: Option<DateTime<Utc>>,
    pub created_lat: Option<f64>,
    pub created_long: Option<f64>,
    pub burned_lat: Option<f64>,
    pub burned_long: Option<f64>,
    pub layout_type: LayoutType,
    pub vertex_count: i32,
    pub letter_assignment: LetterAssignment,
}

impl SigilResponse {
    pub fn from_record(record: SigilRecord, media: &MediaStorage) -> Self {
        Self {
            id: record.id,
            user: record.owner,
            image: media.url_for(&record.image),
            incantation: record.incantation,
            is_burned: record.is_burned,
            created_at: record.created_at,
            burned_at: record.burned_at,
            created_lat: record.created_lat,
            created_long: record.created_long,
            burned_lat: record.burned_lat,
            burned_long: record.burned_long,
            layout_type: record.layout_type,
            vertex_count: record.vertex_count,
            letter_assignment: record.letter_assignment,
        }
    }

    pub fn from_records(records: Vec<SigilRecord>, media: &MediaStorage) -> Vec<Self> {
        records.into_iter().map(|r| Self::from_record(r, media)).collect()
    }
}
