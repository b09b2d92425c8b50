use crate::api::RecordsApi;
use crate::error::Result;
use crate::models::{Invoice, PersonDetail};

/// Loads a person together with the invoices it issued and received.
///
/// Only the person itself is required. The counterparty lookups run side by
/// side; a failed one is shown empty with a message, the other is kept.
pub async fn load_person_detail<A: RecordsApi + ?Sized>(api: &A, id: i64) -> Result<PersonDetail> {
    let person = api.get_person(id).await?;

    let (sales, purchases) = tokio::join!(
        api.person_sales(&person.identification_number),
        api.person_purchases(&person.identification_number)
    );

    let mut errors = Vec::new();
    let mut degrade = |result: Result<Vec<Invoice>>, action: &str| {
        result.unwrap_or_else(|err| {
            tracing::warn!(id, error = %err, action, "counterparty invoices unavailable");
            errors.push(err.user_message(action));
            Vec::new()
        })
    };
    let sales = degrade(sales, "Loading sales");
    let purchases = degrade(purchases, "Loading purchases");

    Ok(PersonDetail {
        person,
        sales,
        purchases,
        invoices_error: (!errors.is_empty()).then(|| errors.join(" ")),
    })
}
