//! Conversational follow-up session, bound to exactly one diagnosis.
//!
//! Created right after a successful diagnosis with the diagnosis embedded as
//! fixed context and a scripted greeting; dropped and replaced when a new
//! photo is submitted. `&mut self` on `send_message` serializes turns per
//! session, so the transcript order always matches send order.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{ChatMessage, Diagnosis};
use crate::ports::ModelPort;

const GREETING: &str = "Any more questions about this diagnosis? Ask away!";

pub struct ChatSession {
    model: Arc<dyn ModelPort>,
    diagnosis: Diagnosis,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(model: Arc<dyn ModelPort>, diagnosis: Diagnosis) -> Self {
        Self {
            model,
            diagnosis,
            transcript: vec![ChatMessage::model(GREETING)],
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn diagnosis(&self) -> &Diagnosis {
        &self.diagnosis
    }

    /// Append a scripted model-role message (registration acknowledgements
    /// and similar UI-driven lines).
    pub fn push_scripted(&mut self, text: impl Into<String>) {
        self.transcript.push(ChatMessage::model(text));
    }

    /// Send one user message and return the model's reply text.
    ///
    /// The user message is appended optimistically before the remote call.
    /// A failed call is absorbed: the error text becomes a model-role
    /// transcript message and is returned like any reply. Callers never see
    /// an `Err` from a chat turn.
    pub async fn send_message(&mut self, text: &str) -> String {
        self.transcript.push(ChatMessage::user(text));
        match self.model.chat_reply(&self.diagnosis, &self.transcript).await {
            Ok(reply) => {
                self.transcript.push(ChatMessage::model(reply.clone()));
                reply
            }
            Err(e) => {
                warn!(error = %e, "chat turn failed, absorbing into transcript");
                let message = format!("Error: {e}");
                self.transcript.push(ChatMessage::model(message.clone()));
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::diagnosis_fixture;
    use crate::domain::{DomainError, PlantPhoto, Role};

    struct EchoModel;

    #[async_trait::async_trait]
    impl ModelPort for EchoModel {
        async fn diagnose(
            &self,
            _photo: &PlantPhoto,
            _question: &str,
        ) -> Result<Diagnosis, DomainError> {
            unreachable!("not used in chat tests")
        }

        async fn recolor_flower(
            &self,
            _photo: &PlantPhoto,
            _target_color: &str,
        ) -> Result<Vec<u8>, DomainError> {
            unreachable!("not used in chat tests")
        }

        async fn render_future_bloom(
            &self,
            _photo: &PlantPhoto,
            _plant_name: &str,
            _target_color: &str,
        ) -> Result<Vec<u8>, DomainError> {
            unreachable!("not used in chat tests")
        }

        async fn chat_reply(
            &self,
            _diagnosis: &Diagnosis,
            transcript: &[ChatMessage],
        ) -> Result<String, DomainError> {
            let last_user = transcript
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.text.clone())
                .unwrap_or_default();
            Ok(format!("echo: {last_user}"))
        }
    }

    struct FailingModel;

    #[async_trait::async_trait]
    impl ModelPort for FailingModel {
        async fn diagnose(
            &self,
            _photo: &PlantPhoto,
            _question: &str,
        ) -> Result<Diagnosis, DomainError> {
            unreachable!("not used in chat tests")
        }

        async fn recolor_flower(
            &self,
            _photo: &PlantPhoto,
            _target_color: &str,
        ) -> Result<Vec<u8>, DomainError> {
            unreachable!("not used in chat tests")
        }

        async fn render_future_bloom(
            &self,
            _photo: &PlantPhoto,
            _plant_name: &str,
            _target_color: &str,
        ) -> Result<Vec<u8>, DomainError> {
            unreachable!("not used in chat tests")
        }

        async fn chat_reply(
            &self,
            _diagnosis: &Diagnosis,
            _transcript: &[ChatMessage],
        ) -> Result<String, DomainError> {
            Err(DomainError::Chat("connection reset".to_string()))
        }
    }

    #[tokio::test]
    async fn session_opens_with_scripted_greeting() {
        let session = ChatSession::new(Arc::new(EchoModel), diagnosis_fixture("Rose"));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Model);
    }

    #[tokio::test]
    async fn turns_are_appended_in_send_order() {
        let mut session = ChatSession::new(Arc::new(EchoModel), diagnosis_fixture("Rose"));
        let reply = session.send_message("why are the leaves yellow?").await;
        assert_eq!(reply, "echo: why are the leaves yellow?");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, Role::User);
        assert_eq!(transcript[1].text, "why are the leaves yellow?");
        assert_eq!(transcript[2].role, Role::Model);
    }

    #[tokio::test]
    async fn failed_turn_is_absorbed_as_model_message() {
        let mut session = ChatSession::new(Arc::new(FailingModel), diagnosis_fixture("Rose"));
        let reply = session.send_message("hello?").await;
        assert!(reply.contains("connection reset"));

        // User message stays (optimistic append), error text lands as a
        // model-role message instead of an Err.
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, Role::User);
        assert_eq!(transcript[2].role, Role::Model);
        assert!(transcript[2].text.contains("connection reset"));
    }
}
