//! Notification engine: derives prioritized care alerts from a plant's most
//! recent diary entry.
//!
//! Pure and deterministic; no I/O, no errors. Notifications always come from
//! the latest entry only, in a fixed rule order. Text rules match a small
//! fixed vocabulary by case-insensitive substring — this is the only
//! severity-classification logic in the system and must not grow smarter
//! without a product decision.

use serde::{Deserialize, Serialize};

use crate::domain::{Diagnosis, DiaryEntry, Plant};

/// The one health label that raises no alert. Anything else is treated as an
/// opaque attention-worthy status.
const HEALTHY_LABEL: &str = "healthy";

/// Hydration summaries that signal deficiency or excess.
const HYDRATION_ALERT_TERMS: &[&str] =
    &["deficien", "underwater", "overwater", "excess", "too dry"];

/// Sunlight summaries that signal deficiency, excess, or too-strong light.
const SUNLIGHT_ALERT_TERMS: &[&str] =
    &["insufficient", "deficien", "excess", "too strong", "intense"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

/// A derived, severity-tagged advisory shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }

    fn info(message: String) -> Self {
        Self {
            severity: Severity::Info,
            message,
        }
    }

    fn success(message: String) -> Self {
        Self {
            severity: Severity::Success,
            message,
        }
    }
}

/// Derive care notifications for a plant from its latest entry.
///
/// Latest = maximum timestamp; on equal timestamps the most recently
/// inserted entry wins (`max_by_key` keeps the last maximum). A plant with
/// no entries yields no notifications; a latest entry with no actionable
/// conditions yields exactly one success notification.
pub fn derive_notifications(plant: &Plant) -> Vec<Notification> {
    let Some(latest) = latest_entry(plant) else {
        return Vec::new();
    };
    let analysis = &latest.analysis;
    let mut notifications = Vec::new();

    if analysis.health_status != HEALTHY_LABEL {
        notifications.push(Notification::warning(format!(
            "{} needs attention: health is \"{}\".",
            plant.name, analysis.health_status
        )));
    }

    if let Some(summary) = &analysis.hydration_summary {
        if signals(summary, HYDRATION_ALERT_TERMS) {
            notifications.push(Notification::warning(format!("Watering: {summary}.")));
        }
    }

    if let Some(summary) = &analysis.sunlight_summary {
        if signals(summary, SUNLIGHT_ALERT_TERMS) {
            notifications.push(Notification::info(format!("Sunlight: {summary}.")));
        }
    }

    // Pest/disease alerts on presence alone; the summary text is not
    // inspected because any value at all means the model saw something.
    if analysis.pest_disease_summary.is_some() {
        notifications.push(Notification::warning(format!(
            "Possible pest or disease on {}. See the full diagnosis for details.",
            plant.name
        )));
    }

    if analysis.repotting_summary.is_some() {
        notifications.push(Notification::info(format!(
            "{} may need repotting. See the full diagnosis for details.",
            plant.name
        )));
    }

    if analysis.pruning_summary.is_some() {
        notifications.push(Notification::info(format!(
            "{} may need pruning. See the full diagnosis for details.",
            plant.name
        )));
    }

    if notifications.is_empty() {
        notifications.push(Notification::success(format!(
            "{} is looking good — no issues in the latest check.",
            plant.name
        )));
    }

    notifications
}

fn latest_entry(plant: &Plant) -> Option<&DiaryEntry> {
    plant.entries.iter().max_by_key(|e| e.date)
}

fn signals(summary: &str, vocabulary: &[&str]) -> bool {
    let lowered = summary.to_lowercase();
    vocabulary.iter().any(|term| lowered.contains(term))
}

/// Convenience used by the UI right after a diagnosis, before any plant is
/// registered: derives notifications as if the diagnosis were a plant's only
/// entry.
pub fn preview_notifications(analysis: &Diagnosis) -> Vec<Notification> {
    use chrono::Utc;

    let plant = Plant {
        id: String::new(),
        name: analysis.plant_name.clone(),
        entries: vec![DiaryEntry {
            id: String::new(),
            date: Utc::now(),
            image_base64: String::new(),
            mime_type: crate::domain::MediaType::Jpeg,
            analysis: analysis.clone(),
        }],
    };
    derive_notifications(&plant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{day, diagnosis_fixture, entry_at, plant_with_entries};

    #[test]
    fn no_entries_yields_no_notifications() {
        let plant = plant_with_entries("Fern", vec![]);
        assert!(derive_notifications(&plant).is_empty());
    }

    #[test]
    fn healthy_with_no_signals_yields_single_success() {
        let plant = plant_with_entries(
            "Monstera",
            vec![entry_at("e1", diagnosis_fixture("Monstera"), day(1))],
        );
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Success);
        assert!(notes[0].message.contains("Monstera"));
    }

    #[test]
    fn unhealthy_status_is_a_warning() {
        let mut d = diagnosis_fixture("Basil");
        d.health_status = "needs attention".to_string();
        let plant = plant_with_entries("Basil", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Warning);
        assert!(notes[0].message.contains("needs attention"));
    }

    #[test]
    fn underwatered_summary_is_a_warning_mentioning_the_summary() {
        let mut d = diagnosis_fixture("Basil");
        d.health_status = "needs attention".to_string();
        d.hydration_summary = Some("underwatered".to_string());
        d.recommendations = vec!["water every 2 days".to_string()];
        let plant = plant_with_entries("Basil", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        let watering: Vec<_> = notes
            .iter()
            .filter(|n| n.severity == Severity::Warning && n.message.contains("underwatered"))
            .collect();
        assert_eq!(watering.len(), 1);
    }

    #[test]
    fn adequate_hydration_raises_nothing() {
        let mut d = diagnosis_fixture("Basil");
        d.hydration_summary = Some("hydration adequate".to_string());
        let plant = plant_with_entries("Basil", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Success);
    }

    #[test]
    fn intense_sunlight_is_info_not_warning() {
        let mut d = diagnosis_fixture("Aloe");
        d.sunlight_summary = Some("Light is too strong at midday".to_string());
        let plant = plant_with_entries("Aloe", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);
        assert!(notes[0].message.contains("too strong"));
    }

    #[test]
    fn pest_summary_alerts_on_presence_regardless_of_text() {
        let mut d = diagnosis_fixture("Rose");
        d.pest_disease_summary = Some("nothing conclusive".to_string());
        let plant = plant_with_entries("Rose", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Warning);
        assert!(notes[0].message.contains("pest"));
    }

    #[test]
    fn emission_order_is_fixed() {
        let mut d = diagnosis_fixture("Tomato");
        d.health_status = "unwell".to_string();
        d.hydration_summary = Some("overwatered".to_string());
        d.sunlight_summary = Some("insufficient light".to_string());
        d.pest_disease_summary = Some("aphids suspected".to_string());
        d.repotting_summary = Some("repotting needed".to_string());
        d.pruning_summary = Some("pruning needed".to_string());
        let plant = plant_with_entries("Tomato", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 6);
        assert!(notes[0].message.contains("health"));
        assert!(notes[1].message.contains("overwatered"));
        assert!(notes[2].message.contains("insufficient"));
        assert!(notes[3].message.contains("pest"));
        assert!(notes[4].message.contains("repotting"));
        assert!(notes[5].message.contains("pruning"));
        assert_eq!(notes[3].severity, Severity::Warning);
        assert_eq!(notes[4].severity, Severity::Info);
    }

    #[test]
    fn only_the_latest_entry_matters() {
        let mut old = diagnosis_fixture("Fig");
        old.health_status = "unwell".to_string();
        old.pest_disease_summary = Some("spider mites".to_string());
        let latest = diagnosis_fixture("Fig");

        let full = plant_with_entries(
            "Fig",
            vec![
                entry_at("e1", old, day(1)),
                entry_at("e2", latest.clone(), day(2)),
            ],
        );
        let only_latest = plant_with_entries("Fig", vec![entry_at("e2", latest, day(2))]);

        assert_eq!(derive_notifications(&full), derive_notifications(&only_latest));
    }

    #[test]
    fn equal_timestamps_prefer_the_most_recently_inserted() {
        let mut first = diagnosis_fixture("Ivy");
        first.health_status = "unwell".to_string();
        let second = diagnosis_fixture("Ivy");
        let plant = plant_with_entries(
            "Ivy",
            vec![entry_at("e1", first, day(3)), entry_at("e2", second, day(3))],
        );
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Success);
    }

    #[test]
    fn guide_alongside_false_flag_does_not_panic() {
        let mut d = diagnosis_fixture("Hydrangea");
        d.is_color_changing_flower = false;
        d.color_change_guide = Some(crate::domain::ColorChangeGuide {
            to_blue: "aluminum sulfate".to_string(),
            to_pink: "garden lime".to_string(),
        });
        let plant = plant_with_entries("Hydrangea", vec![entry_at("e1", d, day(1))]);
        let notes = derive_notifications(&plant);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn preview_matches_single_entry_derivation() {
        let mut d = diagnosis_fixture("Basil");
        d.hydration_summary = Some("underwatered".to_string());
        let preview = preview_notifications(&d);
        let plant = plant_with_entries("Basil", vec![entry_at("e1", d, day(1))]);
        assert_eq!(preview, derive_notifications(&plant));
    }
}
