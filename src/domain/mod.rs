//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod identity;
pub mod notifications;

#[cfg(test)]
pub(crate) mod test_support;

pub use entities::{
    ChatMessage, ColorChangeGuide, Diagnosis, DiaryEntry, MediaType, Plant, PlantPhoto, Role,
};
pub use errors::DomainError;
pub use identity::check_species_match;
pub use notifications::{Notification, Severity, derive_notifications};
