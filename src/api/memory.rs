//! In-memory `RecordsApi` used by the session tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use super::RecordsApi;
use crate::error::{ClientError, Result};
use crate::models::{
    Country, EntityReference, Invoice, InvoiceQuery, InvoiceStatistics, Page, Person,
    PersonStatistics, SortSpec, VatRate,
};
use crate::utils::parse_decimal;

#[derive(Default)]
pub(crate) struct MemoryApi {
    pub invoices: Mutex<Vec<Invoice>>,
    pub persons: Mutex<Vec<Person>>,
    pub statistics: Mutex<InvoiceStatistics>,
    pub person_statistics: Mutex<Vec<PersonStatistics>>,
    pub products: Mutex<Vec<String>>,
    pub next_number: Mutex<String>,
    pub echo_page: Mutex<Option<u32>>,
    failing: Mutex<HashSet<&'static str>>,
    delays: Mutex<Vec<(&'static str, VecDeque<Duration>)>>,
    calls: Mutex<Vec<&'static str>>,
    queries: Mutex<Vec<InvoiceQuery>>,
    saved_invoices: Mutex<Vec<Invoice>>,
    saved_persons: Mutex<Vec<Person>>,
}

impl MemoryApi {
    pub fn new() -> Self {
        MemoryApi::default()
    }

    pub fn with_invoices(invoices: Vec<Invoice>) -> Self {
        let api = MemoryApi::new();
        *api.invoices.lock().unwrap() = invoices;
        api
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    /// The next call of `operation` waits this long before answering.
    pub fn delay_next(&self, operation: &'static str, delay: Duration) {
        let mut delays = self.delays.lock().unwrap();
        match delays.iter_mut().find(|(op, _)| *op == operation) {
            Some((_, queue)) => queue.push_back(delay),
            None => delays.push((operation, VecDeque::from([delay]))),
        }
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|op| **op == operation).count()
    }

    pub fn queries(&self) -> Vec<InvoiceQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<InvoiceQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    pub fn saved_invoices(&self) -> Vec<Invoice> {
        self.saved_invoices.lock().unwrap().clone()
    }

    pub fn saved_persons(&self) -> Vec<Person> {
        self.saved_persons.lock().unwrap().clone()
    }

    async fn enter(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(operation);
        let delay = {
            let mut delays = self.delays.lock().unwrap();
            delays
                .iter_mut()
                .find(|(op, _)| *op == operation)
                .and_then(|(_, queue)| queue.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(operation) {
            return Err(ClientError::remote(StatusCode::INTERNAL_SERVER_ERROR, format!("{} failed", operation)));
        }
        Ok(())
    }
}

fn matches(invoice: &Invoice, query: &InvoiceQuery) -> bool {
    let filters = &query.filters;
    if let Some(product) = &filters.product {
        if !invoice.product.to_lowercase().contains(&product.to_lowercase()) {
            return false;
        }
    }
    if let Some(min) = filters.min_price.as_deref().and_then(|v| parse_decimal(v).ok()) {
        if invoice.price < min {
            return false;
        }
    }
    if let Some(max) = filters.max_price.as_deref().and_then(|v| parse_decimal(v).ok()) {
        if invoice.price > max {
            return false;
        }
    }
    true
}

#[async_trait]
impl RecordsApi for MemoryApi {
    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Page<Invoice>> {
        self.queries.lock().unwrap().push(query.clone());
        self.enter("list_invoices").await?;

        let filtered: Vec<Invoice> = self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|invoice| matches(invoice, query))
            .cloned()
            .collect();
        let size = query.size.max(1) as usize;
        let total_elements = filtered.len() as u64;
        let total_pages = filtered.len().div_ceil(size) as u32;
        let content = filtered
            .into_iter()
            .skip(query.page as usize * size)
            .take(size)
            .collect();
        let number = self.echo_page.lock().unwrap().unwrap_or(query.page);

        Ok(Page {
            content,
            total_pages,
            total_elements,
            number,
        })
    }

    async fn get_invoice(&self, id: i64) -> Result<Invoice> {
        self.enter("get_invoice").await?;
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .find(|invoice| invoice.id == Some(id))
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("Invoice {}", id)))
    }

    async fn invoice_statistics(&self) -> Result<InvoiceStatistics> {
        self.enter("invoice_statistics").await?;
        Ok(self.statistics.lock().unwrap().clone())
    }

    async fn invoice_products(&self) -> Result<Vec<String>> {
        self.enter("invoice_products").await?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn next_invoice_number(&self) -> Result<String> {
        self.enter("next_invoice_number").await?;
        Ok(self.next_number.lock().unwrap().clone())
    }

    async fn create_invoice(&self, invoice: &Invoice) -> Result<Invoice> {
        self.enter("create_invoice").await?;
        let mut saved = invoice.clone();
        saved.id = Some(1000 + self.saved_invoices.lock().unwrap().len() as i64);
        self.saved_invoices.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn update_invoice(&self, id: i64, invoice: &Invoice) -> Result<Invoice> {
        self.enter("update_invoice").await?;
        let mut saved = invoice.clone();
        saved.id = Some(id);
        self.saved_invoices.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn delete_invoice(&self, id: i64) -> Result<()> {
        self.enter("delete_invoice").await?;
        self.invoices.lock().unwrap().retain(|invoice| invoice.id != Some(id));
        Ok(())
    }

    async fn list_persons(&self, _sort: &SortSpec) -> Result<Vec<Person>> {
        self.enter("list_persons").await?;
        Ok(self.persons.lock().unwrap().clone())
    }

    async fn get_person(&self, id: i64) -> Result<Person> {
        self.enter("get_person").await?;
        self.persons
            .lock()
            .unwrap()
            .iter()
            .find(|person| person.id == Some(id))
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("Person {}", id)))
    }

    async fn person_statistics(&self) -> Result<Vec<PersonStatistics>> {
        self.enter("person_statistics").await?;
        Ok(self.person_statistics.lock().unwrap().clone())
    }

    async fn person_sales(&self, identification_number: &str) -> Result<Vec<Invoice>> {
        self.enter("person_sales").await?;
        Ok(self.counterparty_invoices(identification_number, true))
    }

    async fn person_purchases(&self, identification_number: &str) -> Result<Vec<Invoice>> {
        self.enter("person_purchases").await?;
        Ok(self.counterparty_invoices(identification_number, false))
    }

    async fn create_person(&self, person: &Person) -> Result<Person> {
        self.enter("create_person").await?;
        let mut saved = person.clone();
        saved.id = Some(500 + self.saved_persons.lock().unwrap().len() as i64);
        self.saved_persons.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn update_person(&self, id: i64, person: &Person) -> Result<Person> {
        self.enter("update_person").await?;
        let mut saved = person.clone();
        saved.id = Some(id);
        self.saved_persons.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn delete_person(&self, id: i64) -> Result<()> {
        self.enter("delete_person").await?;
        self.persons.lock().unwrap().retain(|person| person.id != Some(id));
        Ok(())
    }
}

impl MemoryApi {
    fn counterparty_invoices(&self, identification_number: &str, as_seller: bool) -> Vec<Invoice> {
        let person_id = self
            .persons
            .lock()
            .unwrap()
            .iter()
            .find(|person| person.identification_number == identification_number)
            .and_then(|person| person.id);
        let Some(person_id) = person_id else {
            return Vec::new();
        };
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|invoice| {
                let party = if as_seller { &invoice.seller } else { &invoice.buyer };
                party.id == Some(person_id)
            })
            .cloned()
            .collect()
    }
}

pub(crate) fn sample_person(id: i64, name: &str, identification_number: &str) -> Person {
    Person {
        id: Some(id),
        name: name.to_string(),
        identification_number: identification_number.to_string(),
        tax_number: format!("CZ{}", identification_number),
        account_number: "123456789".to_string(),
        bank_code: "0800".to_string(),
        iban: "CZ6508000000192000145399".to_string(),
        telephone: "777123456".to_string(),
        mail: format!("{}@example.cz", name.to_lowercase().replace(' ', ".")),
        street: "Hlavni 1".to_string(),
        zip: "11000".to_string(),
        city: "Praha".to_string(),
        country: Country::Czechia,
        note: None,
    }
}

pub(crate) fn sample_invoice(id: i64, product: &str, price: i64) -> Invoice {
    Invoice {
        id: Some(id),
        invoice_number: format!("2024{:03}", id),
        seller: EntityReference {
            id: Some(1),
            name: "Seller".to_string(),
        },
        buyer: EntityReference {
            id: Some(2),
            name: "Buyer".to_string(),
        },
        issued: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2024, 1, 24).unwrap(),
        product: product.to_string(),
        price: Decimal::from(price),
        vat: VatRate::Standard,
        note: None,
    }
}
