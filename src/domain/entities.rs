//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/UI types here — these are mapped from adapters. Field names are
//! camelCase on the wire and in the stored diary blob.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported photo upload formats. Serializes as the MIME string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
}

impl MediaType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Webp => "image/webp",
            MediaType::Gif => "image/gif",
        }
    }

    /// Infer the media type from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "webp" => Some(MediaType::Webp),
            "gif" => Some(MediaType::Gif),
            _ => None,
        }
    }
}

/// A photo submitted for analysis or image editing.
#[derive(Debug, Clone)]
pub struct PlantPhoto {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
}

/// Instructions for shifting a pH-sensitive bloom's color either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorChangeGuide {
    pub to_blue: String,
    pub to_pink: String,
}

/// Structured output of one plant-photo analysis.
///
/// The model is trusted to honor the response schema: only structural parse
/// failure is treated as an error, but every optional field deserializes to
/// `None` when missing so "not applicable" stays representable. Summary
/// presence means the topic is actionable; absence means not applicable,
/// never unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// Canonical species name. Also the diary identity key (see `identity`).
    pub plant_name: String,
    #[serde(default)]
    pub common_alias: Option<String>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub flower_language: Option<String>,
    /// Open vocabulary; "healthy" is the canonical no-alert label, anything
    /// else is treated as an opaque attention-worthy status.
    pub health_status: String,
    #[serde(default)]
    pub hydration_summary: Option<String>,
    #[serde(default)]
    pub hydration_detail: Option<String>,
    #[serde(default)]
    pub sunlight_summary: Option<String>,
    #[serde(default)]
    pub sunlight_detail: Option<String>,
    #[serde(default)]
    pub soil_acidity: Option<String>,
    pub is_color_changing_flower: bool,
    /// Present only when `is_color_changing_flower` is true.
    #[serde(default)]
    pub color_change_guide: Option<ColorChangeGuide>,
    /// Up to 3 colors, only for flowering plants without visible blooms.
    #[serde(default)]
    pub potential_flower_colors: Option<Vec<String>>,
    pub diagnosis: String,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub harvest_summary: Option<String>,
    #[serde(default)]
    pub harvest_detail: Option<String>,
    #[serde(default)]
    pub repotting_summary: Option<String>,
    #[serde(default)]
    pub repotting_detail: Option<String>,
    #[serde(default)]
    pub pruning_summary: Option<String>,
    #[serde(default)]
    pub pruning_detail: Option<String>,
    #[serde(default)]
    pub pest_disease_summary: Option<String>,
    #[serde(default)]
    pub pest_disease_detail: Option<String>,
}

/// One dated diary snapshot: the photo and the diagnosis computed for it.
/// Immutable after creation; removed only by explicit deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub image_base64: String,
    pub mime_type: MediaType,
    pub analysis: Diagnosis,
}

impl DiaryEntry {
    /// Snapshot a successful diagnosis together with its source photo.
    pub fn from_photo(photo: &PlantPhoto, analysis: Diagnosis) -> Self {
        Self {
            id: format!("entry-{}", uuid::Uuid::new_v4()),
            date: Utc::now(),
            image_base64: BASE64.encode(&photo.bytes),
            mime_type: photo.media_type,
            analysis,
        }
    }
}

/// A registered companion plant: a named aggregate of diary entries.
///
/// `name` is taken from the first entry's `plant_name` at registration and
/// never auto-updated. Entries are stored in insertion order; display order
/// is always timestamp descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub entries: Vec<DiaryEntry>,
}

impl Plant {
    /// Register a plant from its first diary entry.
    pub fn register(initial_entry: DiaryEntry) -> Self {
        Self {
            id: format!("plant-{}", uuid::Uuid::new_v4()),
            name: initial_entry.analysis.plant_name.clone(),
            entries: vec![initial_entry],
        }
    }

    /// Entries sorted newest first, for display.
    pub fn entries_newest_first(&self) -> Vec<&DiaryEntry> {
        let mut sorted: Vec<&DiaryEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn in a follow-up chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::diagnosis_fixture;

    #[test]
    fn diagnosis_parses_with_only_required_fields() {
        let json = r#"{
            "plantName": "Monstera",
            "healthStatus": "healthy",
            "isColorChangingFlower": false,
            "diagnosis": "No visible issues.",
            "recommendations": []
        }"#;
        let d: Diagnosis = serde_json::from_str(json).unwrap();
        assert_eq!(d.plant_name, "Monstera");
        assert_eq!(d.hydration_summary, None);
        assert_eq!(d.color_change_guide, None);
        assert_eq!(d.pest_disease_summary, None);
        assert!(d.recommendations.is_empty());
    }

    #[test]
    fn diagnosis_tolerates_guide_despite_flag_false() {
        // The model is untrusted; a guide alongside a false flag must still
        // parse instead of crashing the consumer path.
        let json = r#"{
            "plantName": "Rose",
            "healthStatus": "healthy",
            "isColorChangingFlower": false,
            "colorChangeGuide": {"toBlue": "n/a", "toPink": "n/a"},
            "diagnosis": "Fine.",
            "recommendations": ["water weekly"]
        }"#;
        let d: Diagnosis = serde_json::from_str(json).unwrap();
        assert!(!d.is_color_changing_flower);
        assert!(d.color_change_guide.is_some());
    }

    #[test]
    fn media_type_round_trips_as_mime_string() {
        let json = serde_json::to_string(&MediaType::Jpeg).unwrap();
        assert_eq!(json, "\"image/jpeg\"");
        let back: MediaType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MediaType::Jpeg);
    }

    #[test]
    fn media_type_from_extension_is_case_insensitive() {
        assert_eq!(MediaType::from_extension("JPG"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("webp"), Some(MediaType::Webp));
        assert_eq!(MediaType::from_extension("tiff"), None);
    }

    #[test]
    fn plant_registration_takes_name_from_first_entry() {
        let photo = PlantPhoto {
            bytes: vec![1, 2, 3],
            media_type: MediaType::Png,
        };
        let entry = DiaryEntry::from_photo(&photo, diagnosis_fixture("Basil"));
        let plant = Plant::register(entry);
        assert_eq!(plant.name, "Basil");
        assert_eq!(plant.entries.len(), 1);
    }
}
