//! Mock model adapter for testing without API calls.
//!
//! Returns hardcoded responses for development and testing purposes.

use std::time::Duration;

use tracing::info;

use crate::domain::{ChatMessage, Diagnosis, DomainError, PlantPhoto, Role};
use crate::ports::ModelPort;

/// Mock model adapter.
///
/// Returns predetermined responses without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockModelAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockModelAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    async fn simulate_latency(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }
}

impl Default for MockModelAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelPort for MockModelAdapter {
    async fn diagnose(
        &self,
        photo: &PlantPhoto,
        question: &str,
    ) -> Result<Diagnosis, DomainError> {
        info!(
            bytes = photo.bytes.len(),
            question, "[MOCK] Simulating plant diagnosis"
        );
        self.simulate_latency().await;

        Ok(Diagnosis {
            plant_name: "Monstera Deliciosa".to_string(),
            common_alias: Some("Swiss Cheese Plant".to_string()),
            scientific_name: Some("Monstera deliciosa".to_string()),
            flower_language: None,
            health_status: "healthy".to_string(),
            hydration_summary: Some("hydration adequate".to_string()),
            hydration_detail: Some(
                "[MOCK] Soil looks evenly moist and the leaves are firm; no signs of \
                 drought stress or overwatering."
                    .to_string(),
            ),
            sunlight_summary: Some("sufficient light".to_string()),
            sunlight_detail: Some(
                "[MOCK] Leaf color and internode spacing suggest bright indirect light."
                    .to_string(),
            ),
            soil_acidity: None,
            is_color_changing_flower: false,
            color_change_guide: None,
            potential_flower_colors: None,
            diagnosis: "[MOCK] No disease, pest, or nutrient issues visible. The mock \
                        adapter is useful for exercising the full flow without API costs."
                .to_string(),
            recommendations: vec![
                "[MOCK] Water when the top few centimeters of soil are dry".to_string(),
                "[MOCK] Keep in bright indirect light".to_string(),
            ],
            harvest_summary: None,
            harvest_detail: None,
            repotting_summary: None,
            repotting_detail: None,
            pruning_summary: None,
            pruning_detail: None,
            pest_disease_summary: None,
            pest_disease_detail: None,
        })
    }

    async fn recolor_flower(
        &self,
        photo: &PlantPhoto,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError> {
        info!(target_color, "[MOCK] Simulating flower recolor");
        self.simulate_latency().await;
        // Echo the original bytes; good enough to exercise the save path.
        Ok(photo.bytes.clone())
    }

    async fn render_future_bloom(
        &self,
        photo: &PlantPhoto,
        plant_name: &str,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError> {
        info!(plant_name, target_color, "[MOCK] Simulating future-bloom render");
        self.simulate_latency().await;
        Ok(photo.bytes.clone())
    }

    async fn chat_reply(
        &self,
        diagnosis: &Diagnosis,
        transcript: &[ChatMessage],
    ) -> Result<String, DomainError> {
        info!(
            turns = transcript.len(),
            "[MOCK] Simulating chat reply"
        );
        self.simulate_latency().await;

        let last_user = transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
            .unwrap_or("");
        Ok(format!(
            "[MOCK] About your {}: you asked \"{}\". In production the model would answer \
             from the diagnosis context.",
            diagnosis.plant_name, last_user
        ))
    }
}
