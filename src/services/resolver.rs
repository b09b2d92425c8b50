use crate::models::{EntityReference, Person};

/// Resolves a seller/buyer selection against the persons already loaded for
/// the form. Anything that does not match a loaded person yields an empty
/// reference, which the submit validation reports as missing.
pub fn resolve_reference(persons: &[Person], selected_id: &str) -> EntityReference {
    let Ok(id) = selected_id.trim().parse::<i64>() else {
        return EntityReference::empty();
    };

    match persons.iter().find(|person| person.id == Some(id)) {
        Some(person) => EntityReference::from(person),
        None => {
            tracing::debug!(id, "selected person is not among the loaded persons");
            EntityReference::empty()
        }
    }
}
