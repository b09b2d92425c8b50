use crate::api::RecordsApi;
use crate::models::{Invoice, InvoiceQuery, InvoiceStatistics};
use crate::services::invoice_list::{DeleteOutcome, InvoiceListSession, InvoiceListView};
use crate::services::state::AppState;

pub async fn get_invoices<A: RecordsApi + 'static>(
    query: InvoiceQuery,
    state: &AppState<A>,
) -> Result<InvoiceListView, String> {
    let session =
        InvoiceListSession::open_with_query(state.api.clone(), state.config.debounce_window(), query).await;
    let view = session.snapshot();
    session.close();

    match view.error.clone() {
        Some(message) => Err(message),
        None => Ok(view),
    }
}

pub async fn get_invoice_detail<A: RecordsApi>(invoice_id: i64, state: &AppState<A>) -> Result<Invoice, String> {
    state
        .api
        .get_invoice(invoice_id)
        .await
        .map_err(|e| e.user_message("Loading the invoice"))
}

pub async fn get_invoice_statistics<A: RecordsApi>(state: &AppState<A>) -> Result<InvoiceStatistics, String> {
    state
        .api
        .invoice_statistics()
        .await
        .map_err(|e| e.user_message("Loading statistics"))
}

/// Deletes through a listing session so the caller sees the refreshed page.
pub async fn delete_invoice<A: RecordsApi + 'static>(
    invoice_id: i64,
    confirmed: bool,
    state: &AppState<A>,
) -> Result<InvoiceListView, String> {
    let session = InvoiceListSession::open(state.api.clone(), &state.config).await;
    let outcome = session.delete_invoice(invoice_id, confirmed).await;
    let result = match outcome {
        DeleteOutcome::NotConfirmed => Err("Deletion was not confirmed.".to_string()),
        DeleteOutcome::Failed(message) => Err(message),
        DeleteOutcome::Deleted(refresh) => {
            refresh.settled().await;
            Ok(session.snapshot())
        }
    };
    session.close();
    result
}
