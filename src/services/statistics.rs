use crate::error::ClientError;

/// Identifies one statistics fetch; only the latest one may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsTicket(u64);

/// Summary figures fetched independently of the listing they accompany.
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator<T> {
    figures: T,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl<T: Default> StatisticsAggregator<T> {
    pub fn new() -> Self {
        StatisticsAggregator {
            figures: T::default(),
            generation: 0,
            loading: false,
            error: None,
        }
    }

    pub fn begin(&mut self) -> StatsTicket {
        self.generation += 1;
        self.loading = true;
        StatsTicket(self.generation)
    }

    /// Applies a finished fetch. Returns `false` when a newer fetch has been
    /// started since `ticket` was issued.
    pub fn apply(&mut self, ticket: StatsTicket, result: Result<T, ClientError>) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "stale statistics discarded");
            return false;
        }
        self.loading = false;
        match result {
            Ok(figures) => {
                self.figures = figures;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(code = err.error_code(), error = %err, "statistics unavailable");
                self.figures = T::default();
                self.error = Some(err.user_message("Loading statistics"));
            }
        }
        true
    }

    pub fn figures(&self) -> &T {
        &self.figures
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvoiceStatistics;
    use reqwest::StatusCode;
    use rust_decimal::Decimal;

    fn figures(count: u64) -> InvoiceStatistics {
        InvoiceStatistics {
            all_time_sum: Decimal::from(count * 100),
            current_year_sum: Decimal::from(count * 10),
            invoices_count: count,
        }
    }

    #[test]
    fn failure_degrades_to_zero_with_its_own_error() {
        let mut stats = StatisticsAggregator::<InvoiceStatistics>::new();
        let ticket = stats.begin();
        assert!(stats.apply(ticket, Ok(figures(3))));
        assert_eq!(stats.figures().invoices_count, 3);

        let ticket = stats.begin();
        let failed = Err(ClientError::remote(StatusCode::BAD_GATEWAY, "down"));
        assert!(stats.apply(ticket, failed));
        assert_eq!(stats.figures(), &InvoiceStatistics::default());
        assert!(stats.error().is_some());
        assert!(!stats.is_loading());
    }

    #[test]
    fn older_fetch_cannot_overwrite_newer_one() {
        let mut stats = StatisticsAggregator::<InvoiceStatistics>::new();
        let first = stats.begin();
        let second = stats.begin();

        assert!(stats.apply(second, Ok(figures(5))));
        assert!(!stats.apply(first, Ok(figures(1))));
        assert_eq!(stats.figures().invoices_count, 5);
    }
}
