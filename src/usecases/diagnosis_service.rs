//! Diagnosis service. Validates photo submissions and drives the model port.
//!
//! Single-attempt semantics throughout: any failure is surfaced to the
//! caller as a displayable message, the caller's prior state is untouched,
//! and a retry is a fresh user-initiated call.

use std::sync::Arc;

use tracing::info;

use crate::domain::{Diagnosis, DomainError, PlantPhoto};
use crate::ports::ModelPort;
use crate::usecases::ChatSession;

pub struct DiagnosisService {
    model: Arc<dyn ModelPort>,
}

impl DiagnosisService {
    pub fn new(model: Arc<dyn ModelPort>) -> Self {
        Self { model }
    }

    /// Analyze one plant photo, optionally with a free-text question.
    pub async fn diagnose(
        &self,
        photo: &PlantPhoto,
        question: &str,
    ) -> Result<Diagnosis, DomainError> {
        validate_photo(photo)?;
        info!(
            bytes = photo.bytes.len(),
            media_type = photo.media_type.as_mime(),
            has_question = !question.trim().is_empty(),
            "requesting diagnosis"
        );
        self.model.diagnose(photo, question).await
    }

    /// Recolor the photographed flower to the target color.
    pub async fn recolor_flower(
        &self,
        photo: &PlantPhoto,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError> {
        validate_photo(photo)?;
        info!(target_color, "requesting flower recolor");
        self.model.recolor_flower(photo, target_color).await
    }

    /// Render the plant as it would look blooming in the target color.
    pub async fn render_future_bloom(
        &self,
        photo: &PlantPhoto,
        plant_name: &str,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError> {
        validate_photo(photo)?;
        info!(plant_name, target_color, "requesting future-bloom render");
        self.model
            .render_future_bloom(photo, plant_name, target_color)
            .await
    }

    /// Open a follow-up chat seeded with a successful diagnosis. The session
    /// replaces any previous one in the caller's view.
    pub fn open_chat(&self, diagnosis: Diagnosis) -> ChatSession {
        ChatSession::new(Arc::clone(&self.model), diagnosis)
    }
}

fn validate_photo(photo: &PlantPhoto) -> Result<(), DomainError> {
    if photo.bytes.is_empty() {
        return Err(DomainError::InvalidInput(
            "the submitted image is empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockModelAdapter;
    use crate::domain::MediaType;

    #[tokio::test]
    async fn empty_image_is_rejected_before_the_model_call() {
        let service = DiagnosisService::new(Arc::new(MockModelAdapter::with_delay(0)));
        let photo = PlantPhoto {
            bytes: vec![],
            media_type: MediaType::Png,
        };
        let err = service.diagnose(&photo, "").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn diagnosis_flows_through_and_seeds_a_chat() {
        let service = DiagnosisService::new(Arc::new(MockModelAdapter::with_delay(0)));
        let photo = PlantPhoto {
            bytes: vec![1, 2, 3],
            media_type: MediaType::Jpeg,
        };
        let diagnosis = service.diagnose(&photo, "is it thirsty?").await.unwrap();
        assert!(!diagnosis.plant_name.is_empty());

        let session = service.open_chat(diagnosis.clone());
        assert_eq!(session.diagnosis(), &diagnosis);
        assert_eq!(session.transcript().len(), 1);
    }
}
