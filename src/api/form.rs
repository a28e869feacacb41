//! Parsing of the multipart sigil submission into a validated form.
//!
//! Text fields arrive as loose strings. The boolean and coordinate fields are
//! parsed leniently and never fail; everything else reports per-field errors.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{
    LayoutType, LetterAssignment, LetterSlot, SigilRecord, CIRCLE_VERTEX_COUNT,
    MAX_LAYOUT_TYPE_CHARS,
};
use crate::storage::ImageKind;

/// Field name -> message
pub type FieldErrors = HashMap<String, String>;

/// Strings read as `true` by [`parse_loose_bool`], compared case-insensitively
pub const TRUTHY_TOKENS: [&str; 3] = ["true", "1", "on"];

const REQUIRED: &str = "This field is required.";
// Postgres text columns can't store NUL
const NULL_CHARACTER: &str = "Null characters are not allowed.";

/// `"true"`, `"1"` and `"on"` in any case are true. Anything else, including
/// an absent value, is false.
pub fn parse_loose_bool(raw: Option<&str>) -> bool {
    raw.map(str::to_ascii_lowercase)
        .is_some_and(|v| TRUTHY_TOKENS.contains(&v.as_str()))
}

/// Absent, empty, `"null"` and anything unparsable or non-finite become `None`.
pub fn parse_optional_float(raw: Option<&str>) -> Option<f64> {
    let value = raw?.trim();
    if value.is_empty() || value == "null" {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Image part of the submission
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw multipart content, before validation
#[derive(Debug, Clone, Default)]
pub struct SigilSubmission {
    pub fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

/// Validated sigil fields, everything except the stored image path
#[derive(Debug, Clone, PartialEq)]
pub struct SigilForm {
    pub incantation: String,
    pub is_burned: bool,
    pub created_lat: Option<f64>,
    pub created_long: Option<f64>,
    pub burned_lat: Option<f64>,
    pub burned_long: Option<f64>,
    pub layout_type: LayoutType,
    pub vertex_count: i32,
    pub letter_assignment: LetterAssignment,
}

/// A submission that passed validation, with the image kind it was sniffed as
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub form: SigilForm,
    pub image_kind: ImageKind,
    pub image_bytes: Vec<u8>,
}

impl SigilSubmission {
    pub fn validate(self) -> Result<ValidSubmission, FieldErrors> {
        let form = SigilForm::parse(&self.fields);
        let image = validate_image(self.image);

        match (form, image) {
            (Ok(form), Ok((image_kind, image_bytes))) => Ok(ValidSubmission {
                form,
                image_kind,
                image_bytes,
            }),
            (form, image) => {
                let mut errors = form.err().unwrap_or_default();
                if let Err(message) = image {
                    errors.insert("image".to_string(), message);
                }
                Err(errors)
            }
        }
    }
}

impl SigilForm {
    /// Parse the text fields. A `user` field, if sent, is ignored: the owner
    /// always comes from the authenticated request.
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let field = |name: &str| fields.get(name).map(String::as_str);
        // blank optional fields fall back to their defaults
        let present = |name: &str| field(name).filter(|v| !v.trim().is_empty());

        let incantation = match field("incantation").map(str::trim) {
            None => {
                errors.insert("incantation".to_string(), REQUIRED.to_string());
                String::new()
            }
            Some("") => {
                errors.insert("incantation".to_string(), "This field may not be blank.".to_string());
                String::new()
            }
            Some(text) if text.contains('\0') => {
                errors.insert("incantation".to_string(), NULL_CHARACTER.to_string());
                String::new()
            }
            Some(text) => text.to_string(),
        };

        let layout_type = match present("layout_type").map(|tag| parse_layout_type(tag.trim())) {
            None => LayoutType::default(),
            Some(Ok(layout)) => layout,
            Some(Err(message)) => {
                errors.insert("layout_type".to_string(), message);
                LayoutType::default()
            }
        };

        let vertex_count = match present("vertex_count").map(parse_vertex_count) {
            None => CIRCLE_VERTEX_COUNT,
            Some(Ok(count)) => count,
            Some(Err(message)) => {
                errors.insert("vertex_count".to_string(), message);
                CIRCLE_VERTEX_COUNT
            }
        };

        let letter_assignment = match present("letter_assignment")
            .map(|raw| parse_letter_assignment(raw, vertex_count))
        {
            None => LetterAssignment::default(),
            Some(Ok(assignment)) => assignment,
            Some(Err(message)) => {
                errors.insert("letter_assignment".to_string(), message);
                LetterAssignment::default()
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            incantation,
            is_burned: parse_loose_bool(field("is_burned")),
            created_lat: parse_optional_float(field("created_lat")),
            created_long: parse_optional_float(field("created_long")),
            burned_lat: parse_optional_float(field("burned_lat")),
            burned_long: parse_optional_float(field("burned_long")),
            layout_type,
            vertex_count,
            letter_assignment,
        })
    }

    /// Build the record to persist. `burned_at` is stamped with `now` exactly
    /// when the sigil was burned at creation.
    pub fn into_record(self, id: Uuid, owner: Uuid, image: String, now: DateTime<Utc>) -> SigilRecord {
        SigilRecord {
            id,
            owner,
            incantation: self.incantation,
            image,
            is_burned: self.is_burned,
            created_at: now,
            burned_at: self.is_burned.then_some(now),
            created_lat: self.created_lat,
            created_long: self.created_long,
            burned_lat: self.burned_lat,
            burned_long: self.burned_long,
            layout_type: self.layout_type,
            vertex_count: self.vertex_count,
            letter_assignment: self.letter_assignment,
        }
    }
}

fn validate_image(upload: Option<ImageUpload>) -> Result<(ImageKind, Vec<u8>), String> {
    let upload = upload.ok_or_else(|| "No file was submitted.".to_string())?;
    if upload.bytes.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }
    let kind = ImageKind::sniff(&upload.bytes).ok_or_else(|| {
        tracing::debug!(
            "Upload {:?} declared as {:?} is not a recognised image",
            upload.file_name,
            upload.content_type
        );
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
            .to_string()
    })?;

    // the sniffed kind wins; a mismatch is only worth noting
    if let Some(declared) = upload.content_type.as_deref() {
        if !declared.eq_ignore_ascii_case(kind.content_type()) {
            tracing::debug!(
                "Upload {:?} declared as {} but contains {}",
                upload.file_name,
                declared,
                kind.content_type()
            );
        }
    }
    Ok((kind, upload.bytes))
}

fn parse_layout_type(tag: &str) -> Result<LayoutType, String> {
    if tag.contains('\0') {
        return Err(NULL_CHARACTER.to_string());
    }
    if tag.chars().count() > MAX_LAYOUT_TYPE_CHARS {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            MAX_LAYOUT_TYPE_CHARS
        ));
    }
    Ok(LayoutType::parse(tag))
}

fn parse_vertex_count(raw: &str) -> Result<i32, String> {
    let count: i32 = raw
        .trim()
        .parse()
        .map_err(|_| "A valid integer is required.".to_string())?;
    if count < CIRCLE_VERTEX_COUNT {
        return Err(format!(
            "Ensure this value is greater than or equal to {}.",
            CIRCLE_VERTEX_COUNT
        ));
    }
    Ok(count)
}

/// Items may be `{"letter": "B", "vertex": 0}` objects or `["B", 0]` pairs
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SlotInput {
    Object { letter: String, vertex: u32 },
    Pair(String, u32),
}

fn parse_letter_assignment(raw: &str, vertex_count: i32) -> Result<LetterAssignment, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| "Value must be valid JSON.".to_string())?;
    let items: Vec<SlotInput> = serde_json::from_value(value)
        .map_err(|_| "Expected a list of letter/vertex pairs.".to_string())?;

    let mut slots = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let (letter, vertex) = match item {
            SlotInput::Object { letter, vertex } => (letter, vertex),
            SlotInput::Pair(letter, vertex) => (letter, vertex),
        };
        if letter.chars().count() != 1 {
            return Err(format!("Item {}: letter must be a single character.", index));
        }
        if letter == "\0" {
            return Err(format!("Item {}: {}", index, NULL_CHARACTER));
        }
        if vertex_count > 0 && vertex >= vertex_count as u32 {
            return Err(format!(
                "Item {}: vertex {} is out of range for {} vertices.",
                index, vertex, vertex_count
            ));
        }
        slots.push(LetterSlot { letter, vertex });
    }
    Ok(LetterAssignment(slots))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn png_upload() -> Option<ImageUpload> {
        Some(ImageUpload {
            file_name: Some("sigil.png".into()),
            content_type: Some("image/png".into()),
            bytes: PNG.to_vec(),
        })
    }

    #[test]
    fn loose_bool_accepts_each_token_in_any_case() {
        for token in ["true", "TRUE", "True", "1", "on", "ON", "oN"] {
            assert!(parse_loose_bool(Some(token)), "{token}");
        }
    }

    #[test]
    fn loose_bool_rejects_everything_else() {
        for token in ["false", "0", "off", "yes", "y", "t", "", " true", "true ", "2", "null"] {
            assert!(!parse_loose_bool(Some(token)), "{token:?}");
        }
        assert!(!parse_loose_bool(None));
    }

    #[test]
    fn optional_float_is_lenient() {
        assert_eq!(parse_optional_float(Some("51.5072")), Some(51.5072));
        assert_eq!(parse_optional_float(Some(" -0.1276 ")), Some(-0.1276));
        assert_eq!(parse_optional_float(Some("3")), Some(3.0));
        assert_eq!(parse_optional_float(None), None);
        assert_eq!(parse_optional_float(Some("")), None);
        assert_eq!(parse_optional_float(Some("null")), None);
        assert_eq!(parse_optional_float(Some("north")), None);
        assert_eq!(parse_optional_float(Some("NaN")), None);
        assert_eq!(parse_optional_float(Some("inf")), None);
    }

    #[test]
    fn defaults_apply_when_optional_fields_are_missing_or_blank() {
        let form = SigilForm::parse(&fields(&[
            ("incantation", "I am calm"),
            ("layout_type", ""),
            ("vertex_count", ""),
        ]))
        .unwrap();

        assert_eq!(form.incantation, "I am calm");
        assert!(!form.is_burned);
        assert_eq!(form.created_lat, None);
        assert_eq!(form.layout_type, LayoutType::Unknown);
        assert_eq!(form.vertex_count, CIRCLE_VERTEX_COUNT);
        assert!(form.letter_assignment.is_empty());
    }

    #[test]
    fn incantation_is_required_and_not_blank() {
        let errors = SigilForm::parse(&fields(&[])).unwrap_err();
        assert_eq!(errors["incantation"], REQUIRED);

        let errors = SigilForm::parse(&fields(&[("incantation", "   ")])).unwrap_err();
        assert_eq!(errors["incantation"], "This field may not be blank.");
    }

    #[test]
    fn vertex_count_must_be_an_integer_from_minus_one() {
        let errors = SigilForm::parse(&fields(&[("incantation", "x"), ("vertex_count", "five")]))
            .unwrap_err();
        assert_eq!(errors["vertex_count"], "A valid integer is required.");

        let errors = SigilForm::parse(&fields(&[("incantation", "x"), ("vertex_count", "-2")]))
            .unwrap_err();
        assert!(errors["vertex_count"].contains("-1"));
    }

    #[test]
    fn letter_assignment_accepts_objects_and_pairs() {
        let form = SigilForm::parse(&fields(&[
            ("incantation", "Abracadabra"),
            ("layout_type", "Polygon"),
            ("vertex_count", "4"),
            ("letter_assignment", r#"[{"letter":"B","vertex":0},["R",1],["C",2],{"letter":"D","vertex":3}]"#),
        ]))
        .unwrap();

        let letters: Vec<(&str, u32)> = form
            .letter_assignment
            .0
            .iter()
            .map(|s| (s.letter.as_str(), s.vertex))
            .collect();
        assert_eq!(letters, vec![("B", 0), ("R", 1), ("C", 2), ("D", 3)]);
        assert_eq!(form.layout_type, LayoutType::Polygon);
    }

    #[test]
    fn letter_assignment_errors_name_the_problem() {
        let parse = |raw: &str| {
            SigilForm::parse(&fields(&[
                ("incantation", "x"),
                ("vertex_count", "3"),
                ("letter_assignment", raw),
            ]))
            .unwrap_err()["letter_assignment"]
                .clone()
        };

        assert_eq!(parse("[{"), "Value must be valid JSON.");
        assert_eq!(parse(r#"{"B":0}"#), "Expected a list of letter/vertex pairs.");
        assert!(parse(r#"[["BR",0]]"#).contains("single character"));
        assert!(parse(r#"[["B",3]]"#).contains("out of range"));
    }

    #[test]
    fn layout_type_is_bounded_by_column_width() {
        let longest = "S".repeat(MAX_LAYOUT_TYPE_CHARS);
        let form = SigilForm::parse(&fields(&[("incantation", "x"), ("layout_type", &longest)]))
            .unwrap();
        assert_eq!(form.layout_type, LayoutType::Other(longest));

        let too_long = "S".repeat(MAX_LAYOUT_TYPE_CHARS + 1);
        let errors = SigilForm::parse(&fields(&[("incantation", "x"), ("layout_type", &too_long)]))
            .unwrap_err();
        assert_eq!(errors["layout_type"], "Ensure this field has no more than 50 characters.");
    }

    #[test]
    fn null_characters_are_field_errors() {
        let errors = SigilForm::parse(&fields(&[
            ("incantation", "ab\0cd"),
            ("layout_type", "Star\0"),
            ("letter_assignment", r#"[["\u0000", 0]]"#),
        ]))
        .unwrap_err();

        assert_eq!(errors["incantation"], NULL_CHARACTER);
        assert_eq!(errors["layout_type"], NULL_CHARACTER);
        assert!(errors["letter_assignment"].contains(NULL_CHARACTER));
    }

    #[test]
    fn circle_layouts_do_not_bound_vertex_indexes() {
        let form = SigilForm::parse(&fields(&[
            ("incantation", "x"),
            ("layout_type", "Circle"),
            ("letter_assignment", r#"[["X",7]]"#),
        ]))
        .unwrap();
        assert_eq!(form.letter_assignment.0[0].vertex, 7);
    }

    #[test]
    fn burned_submission_stamps_burned_at_and_keeps_coordinates() {
        let form = SigilForm::parse(&fields(&[
            ("incantation", "I release this"),
            ("is_burned", "true"),
            ("created_lat", "40.7128"),
            ("created_long", "-74.0060"),
            ("burned_lat", "40.7130"),
            ("burned_long", "-74.0062"),
        ]))
        .unwrap();

        let now = Utc::now();
        let owner = Uuid::new_v4();
        let record = form.into_record(Uuid::new_v4(), owner, "sigils/a.png".into(), now);

        assert!(record.is_burned);
        assert_eq!(record.burned_at, Some(now));
        assert_eq!(record.created_at, now);
        assert_eq!(record.owner, owner);
        assert_eq!(record.created_lat, Some(40.7128));
        assert_eq!(record.created_long, Some(-74.0060));
        assert_eq!(record.burned_lat, Some(40.7130));
        assert_eq!(record.burned_long, Some(-74.0062));
    }

    #[test]
    fn unburned_submission_never_has_burned_at() {
        let form = SigilForm::parse(&fields(&[
            ("incantation", "Not yet"),
            ("is_burned", "false"),
            ("burned_lat", "1.0"),
            ("burned_long", "2.0"),
        ]))
        .unwrap();

        let record = form.into_record(Uuid::new_v4(), Uuid::new_v4(), "sigils/a.png".into(), Utc::now());
        assert!(!record.is_burned);
        assert_eq!(record.burned_at, None);
    }

    #[test]
    fn submission_collects_form_and_image_errors_together() {
        let errors = SigilSubmission {
            fields: fields(&[("vertex_count", "many")]),
            image: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors["image"], "No file was submitted.");
        assert!(errors.contains_key("incantation"));
        assert!(errors.contains_key("vertex_count"));
    }

    #[test]
    fn submission_rejects_non_images() {
        let errors = SigilSubmission {
            fields: fields(&[("incantation", "x")]),
            image: Some(ImageUpload {
                file_name: Some("notes.txt".into()),
                content_type: Some("text/plain".into()),
                bytes: b"just text".to_vec(),
            }),
        }
        .validate()
        .unwrap_err();
        assert!(errors["image"].starts_with("Upload a valid image."));
    }

    #[test]
    fn valid_submission_reports_image_kind() {
        let valid = SigilSubmission {
            fields: fields(&[("incantation", "x")]),
            image: png_upload(),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.image_kind, ImageKind::Png);
        assert_eq!(valid.image_bytes, PNG);
    }

    #[test]
    fn declared_content_type_does_not_override_sniffed_kind() {
        let valid = SigilSubmission {
            fields: fields(&[("incantation", "x")]),
            image: Some(ImageUpload {
                file_name: Some("sigil.jpg".into()),
                content_type: Some("image/jpeg".into()),
                bytes: PNG.to_vec(),
            }),
        }
        .validate()
        .unwrap();
        assert_eq!(valid.image_kind, ImageKind::Png);
    }
}
