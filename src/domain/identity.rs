//! Entry consistency guard: a new diary entry must identify the same species
//! the plant was registered under.
//!
//! Comparison is trimmed, case-sensitive exact equality against the model's
//! `plant_name`. Aliases and scientific names are deliberately not consulted,
//! matching the registration rule (the first entry's name is the identity).
//! Runs only when appending to an existing plant, never on first registration.

use crate::domain::{Diagnosis, DomainError};

/// Check that a new diagnosis names the same species as the registered plant.
///
/// Pure comparison, no side effects. On mismatch the caller must reject the
/// append and leave the plant untouched.
pub fn check_species_match(
    registered_name: &str,
    new_diagnosis: &Diagnosis,
) -> Result<(), DomainError> {
    let expected = registered_name.trim();
    let found = new_diagnosis.plant_name.trim();
    if expected == found {
        Ok(())
    } else {
        Err(DomainError::Mismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
