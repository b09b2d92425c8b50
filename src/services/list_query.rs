//! State of the paginated invoice listing.
//!
//! The controller is a plain state machine: user intents go through
//! [`ListQueryController::dispatch`], which returns a [`FetchTicket`] whenever
//! the listing has to be re-queried. The caller performs the fetch and hands
//! the outcome back to [`ListQueryController::reconcile`] together with the
//! ticket; outcomes of superseded tickets are dropped. A response for a page
//! past the end is not shown; the controller asks for the last page instead.

use crate::error::ClientError;
use crate::models::{FilterSet, Invoice, InvoiceQuery, Page, SortSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    /// Debounced filter values.
    FiltersSettled(FilterSet),
    SortClicked(String),
    PageSelected(u32),
    PageSizeChanged(u32),
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub query: InvoiceQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Applied,
    Failed,
    Stale,
    /// The server answered for a page that no longer exists; fetch this one.
    Requery(FetchTicket),
}

#[derive(Debug, Clone)]
pub struct ListQueryController {
    filters: FilterSet,
    sort: SortSpec,
    page: u32,
    size: u32,
    total_pages: u32,
    total_elements: u64,
    rows: Vec<Invoice>,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl ListQueryController {
    pub fn new(size: u32) -> Self {
        ListQueryController {
            filters: FilterSet::default(),
            sort: SortSpec::default(),
            page: 0,
            size: size.max(1),
            total_pages: 0,
            total_elements: 0,
            rows: Vec::new(),
            generation: 0,
            loading: false,
            error: None,
        }
    }

    /// Starts from an explicit query instead of the defaults.
    pub fn from_query(query: InvoiceQuery) -> Self {
        let mut controller = ListQueryController::new(query.size);
        controller.filters = query.filters;
        controller.sort = query.sort;
        controller.page = query.page;
        controller
    }

    pub fn dispatch(&mut self, intent: ListIntent) -> Option<FetchTicket> {
        match intent {
            ListIntent::FiltersSettled(filters) => {
                if filters == self.filters {
                    return None;
                }
                self.filters = filters;
                self.page = 0;
            }
            ListIntent::SortClicked(column) => {
                self.sort = self.sort.cycle(&column);
            }
            ListIntent::PageSelected(page) => {
                let page = self.clamp_page(page);
                if page == self.page {
                    return None;
                }
                self.page = page;
            }
            ListIntent::PageSizeChanged(size) => {
                if size == 0 || size == self.size {
                    return None;
                }
                self.size = size;
                self.page = 0;
            }
            ListIntent::Refresh => {}
        }
        Some(self.issue())
    }

    /// Applies a finished list fetch if `ticket` is still the latest one.
    pub fn reconcile(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Page<Invoice>, ClientError>,
    ) -> Reconciled {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "stale invoice page discarded"
            );
            return Reconciled::Stale;
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(code = err.error_code(), error = %err, "invoice page fetch failed");
                self.error = Some(err.user_message("Loading invoices"));
                return Reconciled::Failed;
            }
        };

        self.total_pages = page.total_pages;
        self.total_elements = page.total_elements;
        let adopted = match page.total_pages {
            0 => 0,
            total => page.number.min(total - 1),
        };
        if adopted != page.number {
            tracing::warn!(
                echoed = page.number,
                total_pages = page.total_pages,
                adopted,
                "server echoed a page outside the valid range"
            );
            if page.total_pages > 0 && ticket.query.page != adopted {
                self.page = adopted;
                return Reconciled::Requery(self.issue());
            }
        }
        self.page = adopted;
        self.rows = page.content;
        self.error = None;
        Reconciled::Applied
    }

    /// Drops a deleted row from the page on display.
    pub fn remove_row(&mut self, id: i64) -> Option<Invoice> {
        let index = self.rows.iter().position(|row| row.id == Some(id))?;
        self.total_elements = self.total_elements.saturating_sub(1);
        Some(self.rows.remove(index))
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn query(&self) -> InvoiceQuery {
        InvoiceQuery {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            page: self.page,
            size: self.size,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn rows(&self) -> &[Invoice] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        let query = self.query();
        tracing::debug!(generation = self.generation, page = query.page, size = query.size, sort = %query.sort, "invoice query issued");
        FetchTicket {
            generation: self.generation,
            query,
        }
    }

    /// Pages are only clamped once a successful fetch has told us how many
    /// there are.
    fn clamp_page(&self, page: u32) -> u32 {
        match self.total_pages {
            0 => page,
            total => page.min(total - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::sample_invoice;
    use crate::models::{FilterField, SortDirection};
    use reqwest::StatusCode;

    fn page_of(ids: &[i64], total_pages: u32, number: u32) -> Page<Invoice> {
        Page {
            content: ids.iter().map(|id| sample_invoice(*id, "Laptop", 100)).collect(),
            total_pages,
            total_elements: total_pages as u64 * 10,
            number,
        }
    }

    fn loaded(total_pages: u32, page: u32) -> ListQueryController {
        let mut controller = ListQueryController::new(10);
        let ticket = controller.dispatch(ListIntent::Refresh).unwrap();
        controller.reconcile(&ticket, Ok(page_of(&[1, 2, 3], total_pages, 0)));
        if page > 0 {
            let ticket = controller.dispatch(ListIntent::PageSelected(page)).unwrap();
            controller.reconcile(&ticket, Ok(page_of(&[4, 5], total_pages, page)));
        }
        controller
    }

    #[test]
    fn filter_change_resets_page_to_zero() {
        let mut controller = loaded(5, 3);
        assert_eq!(controller.page(), 3);

        let filters = FilterSet::default().with(FilterField::Product, "Laptop");
        let ticket = controller.dispatch(ListIntent::FiltersSettled(filters)).unwrap();

        assert_eq!(ticket.query.page, 0);
        assert_eq!(ticket.query.filters.product.as_deref(), Some("Laptop"));
    }

    #[test]
    fn unchanged_filters_do_not_refetch() {
        let mut controller = loaded(5, 2);
        assert!(controller
            .dispatch(ListIntent::FiltersSettled(FilterSet::default()))
            .is_none());
        assert_eq!(controller.page(), 2);
    }

    #[test]
    fn size_change_resets_page_to_zero() {
        let mut controller = loaded(5, 4);
        let ticket = controller.dispatch(ListIntent::PageSizeChanged(25)).unwrap();
        assert_eq!(ticket.query.page, 0);
        assert_eq!(ticket.query.size, 25);
        assert!(controller.dispatch(ListIntent::PageSizeChanged(25)).is_none());
        assert!(controller.dispatch(ListIntent::PageSizeChanged(0)).is_none());
    }

    #[test]
    fn sort_clicks_cycle_and_keep_page() {
        let mut controller = loaded(5, 1);
        let first = controller.dispatch(ListIntent::SortClicked("price".into())).unwrap();
        let second = controller.dispatch(ListIntent::SortClicked("price".into())).unwrap();
        let third = controller.dispatch(ListIntent::SortClicked("price".into())).unwrap();

        assert_eq!(first.query.sort, SortSpec::new("price", SortDirection::Asc));
        assert_eq!(second.query.sort, SortSpec::new("price", SortDirection::Desc));
        assert_eq!(third.query.sort, SortSpec::default());
        assert_eq!(third.query.page, 1);
    }

    #[test]
    fn page_selection_is_clamped_to_known_pages() {
        let mut controller = loaded(3, 0);
        let ticket = controller.dispatch(ListIntent::PageSelected(9)).unwrap();
        assert_eq!(ticket.query.page, 2);
        assert!(controller.dispatch(ListIntent::PageSelected(2)).is_none());
    }

    #[test]
    fn only_the_latest_ticket_is_applied() {
        let mut controller = ListQueryController::new(10);
        let older = controller.dispatch(ListIntent::Refresh).unwrap();
        let newer = controller.dispatch(ListIntent::SortClicked("price".into())).unwrap();

        assert_eq!(controller.reconcile(&newer, Ok(page_of(&[7], 1, 0))), Reconciled::Applied);
        assert_eq!(controller.reconcile(&older, Ok(page_of(&[1, 2], 1, 0))), Reconciled::Stale);
        assert_eq!(controller.rows().len(), 1);
        assert_eq!(controller.rows()[0].id, Some(7));
    }

    #[test]
    fn page_past_the_end_is_requeried_as_last_page() {
        let mut controller = loaded(3, 2);
        let ticket = controller.dispatch(ListIntent::Refresh).unwrap();

        let Reconciled::Requery(next) = controller.reconcile(&ticket, Ok(page_of(&[], 2, 2))) else {
            panic!("expected a follow-up query");
        };
        assert_eq!(next.query.page, 1);
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.rows().len(), 2);

        let outcome = controller.reconcile(&next, Ok(page_of(&[1, 2, 3], 2, 1)));
        assert_eq!(outcome, Reconciled::Applied);
        assert_eq!(controller.rows().len(), 3);
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn echoed_page_for_the_requested_page_is_clamped_without_looping() {
        let mut controller = ListQueryController::new(10);
        let ticket = controller.dispatch(ListIntent::Refresh).unwrap();
        let Reconciled::Requery(next) = controller.reconcile(&ticket, Ok(page_of(&[5], 2, 6))) else {
            panic!("expected a follow-up query");
        };
        assert_eq!(next.query.page, 1);

        assert_eq!(controller.reconcile(&next, Ok(page_of(&[6], 2, 6))), Reconciled::Applied);
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.rows()[0].id, Some(6));

        let ticket = controller.dispatch(ListIntent::Refresh).unwrap();
        assert_eq!(controller.reconcile(&ticket, Ok(page_of(&[], 0, 3))), Reconciled::Applied);
        assert_eq!(controller.page(), 0);
        assert!(controller.rows().is_empty());
    }

    #[test]
    fn page_selection_passes_through_before_any_page_loaded() {
        let mut controller = ListQueryController::new(10);
        let ticket = controller.dispatch(ListIntent::Refresh).unwrap();
        controller.reconcile(
            &ticket,
            Err(ClientError::remote(StatusCode::INTERNAL_SERVER_ERROR, "boom")),
        );

        let ticket = controller.dispatch(ListIntent::PageSelected(2)).unwrap();
        assert_eq!(ticket.query.page, 2);
    }

    #[test]
    fn failure_keeps_rows_and_reports_error() {
        let mut controller = loaded(2, 0);
        let ticket = controller.dispatch(ListIntent::Refresh).unwrap();
        let outcome = controller.reconcile(
            &ticket,
            Err(ClientError::remote(StatusCode::INTERNAL_SERVER_ERROR, "boom")),
        );

        assert_eq!(outcome, Reconciled::Failed);
        assert_eq!(controller.rows().len(), 3);
        assert!(controller.error().unwrap().starts_with("Loading invoices failed"));
        assert!(!controller.is_loading());
    }

    #[test]
    fn removing_a_row_shrinks_the_page() {
        let mut controller = loaded(2, 0);
        let removed = controller.remove_row(2).unwrap();
        assert_eq!(removed.id, Some(2));
        assert_eq!(controller.rows().len(), 2);
        assert_eq!(controller.total_elements(), 19);
        assert!(controller.remove_row(42).is_none());
    }
}
