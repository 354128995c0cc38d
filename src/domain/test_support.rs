//! Shared fixtures for domain tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Diagnosis, DiaryEntry, MediaType, Plant};

/// A healthy diagnosis with every optional field absent.
pub(crate) fn diagnosis_fixture(name: &str) -> Diagnosis {
    Diagnosis {
        plant_name: name.to_string(),
        common_alias: None,
        scientific_name: None,
        flower_language: None,
        health_status: "healthy".to_string(),
        hydration_summary: None,
        hydration_detail: None,
        sunlight_summary: None,
        sunlight_detail: None,
        soil_acidity: None,
        is_color_changing_flower: false,
        color_change_guide: None,
        potential_flower_colors: None,
        diagnosis: "No visible issues.".to_string(),
        recommendations: vec![],
        harvest_summary: None,
        harvest_detail: None,
        repotting_summary: None,
        repotting_detail: None,
        pruning_summary: None,
        pruning_detail: None,
        pest_disease_summary: None,
        pest_disease_detail: None,
    }
}

pub(crate) fn entry_at(id: &str, analysis: Diagnosis, date: DateTime<Utc>) -> DiaryEntry {
    DiaryEntry {
        id: id.to_string(),
        date,
        image_base64: "aGVsbG8=".to_string(),
        mime_type: MediaType::Jpeg,
        analysis,
    }
}

pub(crate) fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, d, 12, 0, 0).unwrap()
}

pub(crate) fn plant_with_entries(name: &str, entries: Vec<DiaryEntry>) -> Plant {
    Plant {
        id: "plant-test".to_string(),
        name: name.to_string(),
        entries,
    }
}
