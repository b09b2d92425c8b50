//! Access to the remote invoice/person service.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Invoice, InvoiceQuery, InvoiceStatistics, Page, Person, PersonStatistics, SortSpec,
};

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::HttpRecordsApi;

/// Remote operations the listing views and forms depend on.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Page<Invoice>>;
    async fn get_invoice(&self, id: i64) -> Result<Invoice>;
    async fn invoice_statistics(&self) -> Result<InvoiceStatistics>;
    async fn invoice_products(&self) -> Result<Vec<String>>;
    async fn next_invoice_number(&self) -> Result<String>;
    async fn create_invoice(&self, invoice: &Invoice) -> Result<Invoice>;
    async fn update_invoice(&self, id: i64, invoice: &Invoice) -> Result<Invoice>;
    async fn delete_invoice(&self, id: i64) -> Result<()>;

    async fn list_persons(&self, sort: &SortSpec) -> Result<Vec<Person>>;
    async fn get_person(&self, id: i64) -> Result<Person>;
    async fn person_statistics(&self) -> Result<Vec<PersonStatistics>>;
    async fn person_sales(&self, identification_number: &str) -> Result<Vec<Invoice>>;
    async fn person_purchases(&self, identification_number: &str) -> Result<Vec<Invoice>>;
    async fn create_person(&self, person: &Person) -> Result<Person>;
    async fn update_person(&self, id: i64, person: &Person) -> Result<Person>;
    async fn delete_person(&self, id: i64) -> Result<()>;
}
