//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. No variant is retried
//! automatically anywhere; a failure is terminal for that invocation and a
//! retry is always a fresh user action.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Required credential absent. Fatal for any real model call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport or schema-parse failure of a diagnosis call.
    #[error("Diagnosis failed: {0}")]
    Diagnosis(String),

    /// Image edit/generation call failed or returned no image payload.
    #[error("Image generation failed: {0}")]
    Generation(String),

    /// Chat-turn transport failure. Absorbed into the transcript by the
    /// session, never surfaced as an exception to the UI.
    #[error("Chat error: {0}")]
    Chat(String),

    /// Species identity guard rejection. Recoverable: the user re-submits.
    #[error("This photo looks like \"{found}\", but the diary is for \"{expected}\"")]
    Mismatch { expected: String, found: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
