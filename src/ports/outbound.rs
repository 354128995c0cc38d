//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ChatMessage, Diagnosis, DomainError, PlantPhoto};

/// Generative model gateway. One request type: image + instructional text,
/// returning either structured data or an image payload.
///
/// No call is retried or cancelled; a failure is terminal for that
/// invocation and the caller re-invokes to retry.
#[async_trait::async_trait]
pub trait ModelPort: Send + Sync {
    /// Analyze a plant photo and return a structured diagnosis.
    /// `question` is the user's optional free-text addition (may be empty).
    async fn diagnose(&self, photo: &PlantPhoto, question: &str)
    -> Result<Diagnosis, DomainError>;

    /// Recolor the flower in the photo to `target_color`, leaving everything
    /// else untouched. Returns the edited image bytes.
    async fn recolor_flower(
        &self,
        photo: &PlantPhoto,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError>;

    /// Render the photographed plant as it would look blooming in
    /// `target_color`, keeping leaves, stem, pot and background.
    async fn render_future_bloom(
        &self,
        photo: &PlantPhoto,
        plant_name: &str,
        target_color: &str,
    ) -> Result<Vec<u8>, DomainError>;

    /// Answer the latest user message in a follow-up chat. The diagnosis is
    /// the fixed context; `transcript` is the full ordered history including
    /// the message being answered.
    async fn chat_reply(
        &self,
        diagnosis: &Diagnosis,
        transcript: &[ChatMessage],
    ) -> Result<String, DomainError>;
}

/// Persistent storage boundary: one key, one blob. Full read / full rewrite
/// only; the write must be atomic (no partial blobs observable).
#[async_trait::async_trait]
pub trait StoragePort: Send + Sync {
    /// Read the stored blob. `None` when nothing has been written yet.
    async fn read(&self) -> Result<Option<String>, DomainError>;

    /// Atomically replace the stored blob.
    async fn write(&self, blob: &str) -> Result<(), DomainError>;
}
