use crate::api::RecordsApi;
use crate::models::{PersonDetail, PersonRow, SortSpec};
use crate::services::person_detail::load_person_detail;
use crate::services::person_list::{PersonDeleteOutcome, PersonListSession};
use crate::services::state::AppState;

pub async fn get_persons<A: RecordsApi>(sort: SortSpec, state: &AppState<A>) -> Result<Vec<PersonRow>, String> {
    let session = PersonListSession::open(state.api.clone(), sort).await;
    if let Some(message) = session.state().error() {
        return Err(message.to_string());
    }
    if let Some(message) = session.state().statistics_error() {
        tracing::warn!(%message, "person statistics missing from listing");
    }
    Ok(session.state().rows())
}

pub async fn get_person_detail<A: RecordsApi>(person_id: i64, state: &AppState<A>) -> Result<PersonDetail, String> {
    load_person_detail(state.api.as_ref(), person_id)
        .await
        .map_err(|e| e.user_message("Loading the person"))
}

pub async fn delete_person<A: RecordsApi>(
    person_id: i64,
    confirmed: bool,
    state: &AppState<A>,
) -> Result<Vec<PersonRow>, String> {
    let mut session = PersonListSession::open(state.api.clone(), SortSpec::default()).await;
    match session.delete_person(person_id, confirmed).await {
        PersonDeleteOutcome::Deleted => Ok(session.state().rows()),
        PersonDeleteOutcome::NotConfirmed => Err("Deletion was not confirmed.".to_string()),
        PersonDeleteOutcome::Failed(message) => Err(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{sample_person, MemoryApi};
    use crate::config::ClientConfig;
    use std::sync::Arc;

    fn state() -> AppState<MemoryApi> {
        let api = MemoryApi::new();
        *api.persons.lock().unwrap() = vec![sample_person(1, "Alfa", "11111111"), sample_person(2, "Beta", "22222222")];
        AppState::with_api(Arc::new(api), ClientConfig::default())
    }

    #[tokio::test]
    async fn listing_survives_missing_statistics() {
        let state = state();
        state.api.fail("person_statistics");
        let rows = get_persons(SortSpec::default(), &state).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn missing_person_reads_as_not_found() {
        let err = get_person_detail(9, &state()).await.unwrap_err();
        assert_eq!(err, "Person 9 was not found.");
    }

    #[tokio::test]
    async fn confirmed_delete_drops_the_row() {
        let state = state();
        let rows = delete_person(1, true, &state).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].person.name, "Beta");
    }
}
