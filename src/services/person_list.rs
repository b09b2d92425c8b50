use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::api::RecordsApi;
use crate::models::{Person, PersonRow, PersonStatistics, SortSpec};
use crate::services::statistics::StatisticsAggregator;

/// Joins per-person statistics onto the persons by id. Persons without
/// statistics show zero revenue and expenses.
pub fn merge_statistics(persons: &[Person], statistics: &[PersonStatistics]) -> Vec<PersonRow> {
    let by_id: HashMap<i64, &PersonStatistics> =
        statistics.iter().map(|stats| (stats.person_id, stats)).collect();

    persons
        .iter()
        .map(|person| {
            let stats = person.id.and_then(|id| by_id.get(&id));
            PersonRow {
                person: person.clone(),
                revenue: stats.map(|s| s.revenue).unwrap_or(Decimal::ZERO),
                expenses: stats.map(|s| s.expenses).unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonDeleteOutcome {
    NotConfirmed,
    Deleted,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct PersonListState {
    sort: SortSpec,
    persons: Vec<Person>,
    error: Option<String>,
    statistics: StatisticsAggregator<Vec<PersonStatistics>>,
}

impl PersonListState {
    pub fn rows(&self) -> Vec<PersonRow> {
        merge_statistics(&self.persons, self.statistics.figures())
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn statistics_error(&self) -> Option<&str> {
        self.statistics.error()
    }
}

pub struct PersonListSession<A: RecordsApi> {
    api: Arc<A>,
    state: PersonListState,
}

impl<A: RecordsApi> PersonListSession<A> {
    pub async fn open(api: Arc<A>, sort: SortSpec) -> Self {
        let mut session = PersonListSession {
            api,
            state: PersonListState {
                sort,
                ..PersonListState::default()
            },
        };
        session.refresh().await;
        session
    }

    pub fn state(&self) -> &PersonListState {
        &self.state
    }

    pub async fn click_sort(&mut self, column: &str) {
        self.state.sort = self.state.sort.cycle(column);
        self.refresh().await;
    }

    /// Re-fetches persons and their statistics side by side.
    pub async fn refresh(&mut self) {
        let ticket = self.state.statistics.begin();
        let (persons, statistics) = tokio::join!(
            self.api.list_persons(&self.state.sort),
            self.api.person_statistics()
        );

        match persons {
            Ok(persons) => {
                self.state.persons = persons;
                self.state.error = None;
            }
            Err(err) => {
                tracing::error!(error = %err, "person listing failed");
                self.state.error = Some(err.user_message("Loading persons"));
            }
        }
        self.state.statistics.apply(ticket, statistics);
    }

    pub async fn delete_person(&mut self, id: i64, confirmed: bool) -> PersonDeleteOutcome {
        if !confirmed {
            return PersonDeleteOutcome::NotConfirmed;
        }
        if let Err(err) = self.api.delete_person(id).await {
            tracing::error!(id, error = %err, "person delete failed");
            let message = err.user_message("Deleting the person");
            self.state.error = Some(message.clone());
            return PersonDeleteOutcome::Failed(message);
        }

        tracing::info!(id, "person deleted");
        self.state.persons.retain(|person| person.id != Some(id));
        let ticket = self.state.statistics.begin();
        let statistics = self.api.person_statistics().await;
        self.state.statistics.apply(ticket, statistics);
        PersonDeleteOutcome::Deleted
    }
}
