//! Application use cases. Orchestrate domain logic via ports.

pub mod chat_session;
pub mod diagnosis_service;
pub mod diary_service;

pub use chat_session::ChatSession;
pub use diagnosis_service::DiagnosisService;
pub use diary_service::DiaryService;
