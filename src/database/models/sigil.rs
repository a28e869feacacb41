use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Vertex count recorded for circular layouts, which have no vertices.
pub const CIRCLE_VERTEX_COUNT: i32 = -1;

/// Longest layout tag the `sigils.layout_type` column holds, in characters.
pub const MAX_LAYOUT_TYPE_CHARS: usize = 50;

/// Shape the sigil letters are laid out on. The set is open: clients may
/// send tags this service doesn't know, and those are stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayoutType {
    Circle,
    Polygon,
    #[default]
    Unknown,
    Other(String),
}

impl LayoutType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "Circle" => LayoutType::Circle,
            "Polygon" => LayoutType::Polygon,
            "Unknown" | "" => LayoutType::Unknown,
            other => LayoutType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LayoutType::Circle => "Circle",
            LayoutType::Polygon => "Polygon",
            LayoutType::Unknown => "Unknown",
            LayoutType::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for LayoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LayoutType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayoutType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(LayoutType::parse(&tag))
    }
}

/// One letter pinned to one vertex of the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSlot {
    pub letter: String,
    pub vertex: u32,
}

/// Ordered letter-to-vertex mapping, persisted as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterAssignment(pub Vec<LetterSlot>);

impl LetterAssignment {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A persisted sigil.
///
/// `burned_at` is set exactly when `is_burned` is true; the pair is only
/// ever written together, at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SigilRecord {
    pub id: Uuid,
    pub owner: Uuid,
    pub incantation: String,
    /// Path of the stored image, relative to the media root
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_type_keeps_unknown_tags() {
        assert_eq!(LayoutType::parse("Circle"), LayoutType::Circle);
        assert_eq!(LayoutType::parse("Polygon"), LayoutType::Polygon);
        assert_eq!(LayoutType::parse(""), LayoutType::Unknown);
        assert_eq!(LayoutType::parse("Spiral").as_str(), "Spiral");
    }

    #[test]
    fn layout_type_serializes_as_plain_string() {
        let json = serde_json::to_value(LayoutType::Polygon).unwrap();
        assert_eq!(json, serde_json::json!("Polygon"));
        let back: LayoutType = serde_json::from_value(serde_json::json!("Star")).unwrap();
        assert_eq!(back, LayoutType::Other("Star".to_string()));
    }

    #[test]
    fn letter_assignment_is_a_bare_array() {
        let assignment = LetterAssignment(vec![LetterSlot { letter: "B".into(), vertex: 0 }]);
        assert_eq!(
            serde_json::to_value(&assignment).unwrap(),
            serde_json::json!([{ "letter": "B", "vertex": 0 }])
        );
    }
}
