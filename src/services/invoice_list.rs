//! Invoice listing bound to the remote service.
//!
//! The session owns a [`ListQueryController`] and a statistics aggregator
//! behind one mutex. Filter keystrokes go through a [`Debouncer`]; every other
//! intent is dispatched at once. Each accepted intent spawns one list fetch and
//! one statistics fetch, which complete independently and are reconciled
//! against their tickets. Once the session is closed no completion touches the
//! state any more.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::RecordsApi;
use crate::config::ClientConfig;
use crate::models::{
    FilterField, FilterSet, Invoice, InvoiceQuery, InvoiceStatistics, Person, SortDirection,
    SortSpec,
};
use crate::services::debounce::Debouncer;
use crate::services::list_query::{FetchTicket, ListIntent, ListQueryController, Reconciled};
use crate::services::statistics::StatisticsAggregator;

struct ListState {
    list: ListQueryController,
    statistics: StatisticsAggregator<InvoiceStatistics>,
    draft_filters: FilterSet,
    products: Vec<String>,
    persons: Vec<Person>,
    options_error: Option<String>,
    closed: bool,
}

type Shared = Arc<Mutex<ListState>>;

fn lock(shared: &Mutex<ListState>) -> MutexGuard<'_, ListState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything a renderer needs, copied out of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListView {
    pub rows: Vec<Invoice>,
    pub query: InvoiceQuery,
    pub draft_filters: FilterSet,
    pub total_pages: u32,
    pub total_elements: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub statistics: InvoiceStatistics,
    pub statistics_loading: bool,
    pub statistics_error: Option<String>,
    pub products: Vec<String>,
    pub persons: Vec<Person>,
    pub options_error: Option<String>,
}

/// Handles of the fetches started by one intent.
#[derive(Default)]
pub struct Refresh {
    list: Option<JoinHandle<()>>,
    statistics: Option<JoinHandle<()>>,
}

impl Refresh {
    pub fn is_empty(&self) -> bool {
        self.list.is_none() && self.statistics.is_none()
    }

    /// Waits until both fetches have been reconciled (or dropped as stale).
    pub async fn settled(self) {
        for handle in [self.list, self.statistics].into_iter().flatten() {
            if let Err(err) = handle.await {
                tracing::debug!(error = %err, "invoice fetch task did not finish");
            }
        }
    }
}

#[derive(Debug)]
pub enum DeleteOutcome {
    NotConfirmed,
    Deleted(Refresh),
    Failed(String),
}

impl std::fmt::Debug for Refresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresh")
            .field("list", &self.list.is_some())
            .field("statistics", &self.statistics.is_some())
            .finish()
    }
}

pub struct InvoiceListSession<A: RecordsApi + 'static> {
    api: Arc<A>,
    shared: Shared,
    debouncer: Debouncer<FilterSet>,
    settle_task: JoinHandle<()>,
}

impl<A: RecordsApi + 'static> InvoiceListSession<A> {
    pub async fn open(api: Arc<A>, config: &ClientConfig) -> Self {
        let query = InvoiceQuery {
            filters: FilterSet::default(),
            sort: SortSpec::default(),
            page: 0,
            size: config.page_size,
        };
        Self::open_with_query(api, config.debounce_window(), query).await
    }

    /// Opens the listing on `query` and waits for the first page, the
    /// statistics and the filter options.
    pub async fn open_with_query(api: Arc<A>, debounce: Duration, query: InvoiceQuery) -> Self {
        let shared: Shared = Arc::new(Mutex::new(ListState {
            draft_filters: query.filters.clone(),
            list: ListQueryController::from_query(query),
            statistics: StatisticsAggregator::new(),
            products: Vec::new(),
            persons: Vec::new(),
            options_error: None,
            closed: false,
        }));

        let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<FilterSet>();
        let debouncer = Debouncer::spawn(debounce, settled_tx);
        let settle_task = {
            let api = api.clone();
            let shared = shared.clone();
            tokio::spawn(async move {
                while let Some(filters) = settled_rx.recv().await {
                    let ticket = {
                        let mut state = lock(&shared);
                        if state.closed {
                            return;
                        }
                        state.list.dispatch(ListIntent::FiltersSettled(filters))
                    };
                    if let Some(ticket) = ticket {
                        spawn_fetches(&api, &shared, ticket);
                    }
                }
            })
        };

        let session = InvoiceListSession {
            api,
            shared,
            debouncer,
            settle_task,
        };
        let initial = session.refresh();
        tokio::join!(initial.settled(), session.load_filter_options());
        session
    }

    pub fn snapshot(&self) -> InvoiceListView {
        let state = lock(&self.shared);
        InvoiceListView {
            rows: state.list.rows().to_vec(),
            query: state.list.query(),
            draft_filters: state.draft_filters.clone(),
            total_pages: state.list.total_pages(),
            total_elements: state.list.total_elements(),
            loading: state.list.is_loading(),
            error: state.list.error().map(str::to_string),
            statistics: state.statistics.figures().clone(),
            statistics_loading: state.statistics.is_loading(),
            statistics_error: state.statistics.error().map(str::to_string),
            products: state.products.clone(),
            persons: state.persons.clone(),
            options_error: state.options_error.clone(),
        }
    }

    /// Records a filter keystroke. The listing is re-queried once input has
    /// been quiet for the debounce window.
    pub fn set_filter(&self, field: FilterField, value: &str) {
        let filters = {
            let mut state = lock(&self.shared);
            if state.closed {
                return;
            }
            state.draft_filters.set(field, value);
            state.draft_filters.clone()
        };
        self.debouncer.push(filters);
    }

    pub fn click_sort(&self, column: &str) -> Refresh {
        self.dispatch(ListIntent::SortClicked(column.to_string()))
    }

    pub fn select_page(&self, page: u32) -> Refresh {
        self.dispatch(ListIntent::PageSelected(page))
    }

    pub fn set_page_size(&self, size: u32) -> Refresh {
        self.dispatch(ListIntent::PageSizeChanged(size))
    }

    pub fn refresh(&self) -> Refresh {
        self.dispatch(ListIntent::Refresh)
    }

    /// Deletes an invoice after the user confirmed it. The row leaves the
    /// page immediately; statistics and the page itself are then re-fetched.
    pub async fn delete_invoice(&self, id: i64, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            return DeleteOutcome::NotConfirmed;
        }

        match self.api.delete_invoice(id).await {
            Ok(()) => {
                tracing::info!(id, "invoice deleted");
                {
                    let mut state = lock(&self.shared);
                    if state.closed {
                        return DeleteOutcome::Deleted(Refresh::default());
                    }
                    state.list.remove_row(id);
                }
                DeleteOutcome::Deleted(self.refresh())
            }
            Err(err) => {
                tracing::error!(id, error = %err, "invoice delete failed");
                let message = err.user_message("Deleting the invoice");
                lock(&self.shared).list.set_error(message.clone());
                DeleteOutcome::Failed(message)
            }
        }
    }

    /// Stops the debouncer and detaches every in-flight fetch.
    pub fn close(&self) {
        lock(&self.shared).closed = true;
        self.debouncer.cancel();
        self.settle_task.abort();
    }

    fn dispatch(&self, intent: ListIntent) -> Refresh {
        let ticket = {
            let mut state = lock(&self.shared);
            if state.closed {
                return Refresh::default();
            }
            state.list.dispatch(intent)
        };
        match ticket {
            Some(ticket) => spawn_fetches(&self.api, &self.shared, ticket),
            None => Refresh::default(),
        }
    }

    async fn load_filter_options(&self) {
        let name_order = SortSpec::new("name", SortDirection::Asc);
        let (products, persons) =
            tokio::join!(self.api.invoice_products(), self.api.list_persons(&name_order));

        let mut state = lock(&self.shared);
        if state.closed {
            return;
        }
        let mut errors = Vec::new();
        state.products = products.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "product names unavailable");
            errors.push(err.user_message("Loading products"));
            Vec::new()
        });
        state.persons = persons.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "persons for filters unavailable");
            errors.push(err.user_message("Loading persons"));
            Vec::new()
        });
        state.options_error = (!errors.is_empty()).then(|| errors.join(" "));
    }
}

impl<A: RecordsApi + 'static> Drop for InvoiceListSession<A> {
    fn drop(&mut self) {
        self.close();
    }
}

fn spawn_fetches<A: RecordsApi + 'static>(api: &Arc<A>, shared: &Shared, ticket: FetchTicket) -> Refresh {
    let stats_ticket = lock(shared).statistics.begin();

    let list = {
        let api = api.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let mut ticket = ticket;
            loop {
                let result = api.list_invoices(&ticket.query).await;
                let outcome = {
                    let mut state = lock(&shared);
                    if state.closed {
                        return;
                    }
                    state.list.reconcile(&ticket, result)
                };
                match outcome {
                    Reconciled::Requery(next) => ticket = next,
                    Reconciled::Applied | Reconciled::Failed | Reconciled::Stale => return,
                }
            }
        })
    };

    let statistics = {
        let api = api.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result = api.invoice_statistics().await;
            let mut state = lock(&shared);
            if state.closed {
                return;
            }
            state.statistics.apply(stats_ticket, result);
        })
    };

    Refresh {
        list: Some(list),
        statistics: Some(statistics),
    }
}
