use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RecordsApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    Invoice, InvoiceQuery, InvoiceStatistics, Page, Person, PersonStatistics, SortSpec,
};

const SERVICE_NAME: &str = "invoice-service";

/// `RecordsApi` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpRecordsApi {
    client: Client,
    base_url: String,
}

impl HttpRecordsApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T>(&self, endpoint: &str, resource: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(self.url(endpoint));
        self.send_json(request, resource).await
    }

    async fn get_with_query<T>(&self, endpoint: &str, pairs: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(self.url(endpoint)).query(pairs);
        self.send_json(request, endpoint).await
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send_json(request, endpoint).await
    }

    async fn put<B, T>(&self, endpoint: &str, body: &B, resource: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.put(self.url(endpoint)).json(body);
        self.send_json(request, resource).await
    }

    async fn delete(&self, endpoint: &str, resource: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(endpoint))
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, endpoint))?;

        self.check_status(response, resource).await.map(|_| ())
    }

    async fn send_json<T>(&self, request: RequestBuilder, resource: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, resource))?;
        let response = self.check_status(response, resource).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::decode(format!("Failed to deserialize {}: {}", resource, e)))
    }

    async fn check_status(&self, response: Response, resource: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(resource));
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!(%status, resource, "remote call failed");
        Err(ClientError::remote(status, body))
    }

    fn map_reqwest_error(&self, error: reqwest::Error, operation: &str) -> ClientError {
        if error.is_timeout() {
            ClientError::timeout(format!("Request to {} timed out", operation))
        } else if error.is_connect() {
            ClientError::service_unavailable(SERVICE_NAME)
        } else {
            ClientError::HttpClient(error)
        }
    }
}

#[async_trait]
impl RecordsApi for HttpRecordsApi {
    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Page<Invoice>> {
        let pairs = query.to_query_pairs();
        tracing::debug!(?pairs, "fetching invoice page");
        self.get_with_query("/api/invoices", &pairs).await
    }

    async fn get_invoice(&self, id: i64) -> Result<Invoice> {
        self.get(&format!("/api/invoices/{}", id), &format!("Invoice {}", id))
            .await
    }

    async fn invoice_statistics(&self) -> Result<InvoiceStatistics> {
        self.get("/api/invoices/statistics", "Invoice statistics").await
    }

    async fn invoice_products(&self) -> Result<Vec<String>> {
        self.get("/api/invoices/products", "Product list").await
    }

    /// The number comes either as a JSON string or as plain text.
    async fn next_invoice_number(&self) -> Result<String> {
        let resource = "Next invoice number";
        let response = self
            .client
            .get(self.url("/api/invoices/next-number"))
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, resource))?;
        let body = self
            .check_status(response, resource)
            .await?
            .text()
            .await
            .map_err(|e| ClientError::decode(format!("Failed to read {}: {}", resource, e)))?;

        Ok(serde_json::from_str::<String>(&body).unwrap_or_else(|_| body.trim().to_string()))
    }

    async fn create_invoice(&self, invoice: &Invoice) -> Result<Invoice> {
        self.post("/api/invoices", invoice).await
    }

    async fn update_invoice(&self, id: i64, invoice: &Invoice) -> Result<Invoice> {
        self.put(&format!("/api/invoices/{}", id), invoice, &format!("Invoice {}", id))
            .await
    }

    async fn delete_invoice(&self, id: i64) -> Result<()> {
        self.delete(&format!("/api/invoices/{}", id), &format!("Invoice {}", id))
            .await
    }

    async fn list_persons(&self, sort: &SortSpec) -> Result<Vec<Person>> {
        let pairs = vec![("sort".to_string(), sort.to_string())];
        self.get_with_query("/api/persons", &pairs).await
    }

    async fn get_person(&self, id: i64) -> Result<Person> {
        self.get(&format!("/api/persons/{}", id), &format!("Person {}", id))
            .await
    }

    async fn person_statistics(&self) -> Result<Vec<PersonStatistics>> {
        self.get("/api/persons/statistics", "Person statistics").await
    }

    async fn person_sales(&self, identification_number: &str) -> Result<Vec<Invoice>> {
        self.get(
            &format!("/api/persons/{}/sales", identification_number),
            &format!("Sales of {}", identification_number),
        )
        .await
    }

    async fn person_purchases(&self, identification_number: &str) -> Result<Vec<Invoice>> {
        self.get(
            &format!("/api/persons/{}/purchases", identification_number),
            &format!("Purchases of {}", identification_number),
        )
        .await
    }

    async fn create_person(&self, person: &Person) -> Result<Person> {
        self.post("/api/persons", person).await
    }

    async fn update_person(&self, id: i64, person: &Person) -> Result<Person> {
        self.put(&format!("/api/persons/{}", id), person, &format!("Person {}", id))
            .await
    }

    async fn delete_person(&self, id: i64) -> Result<()> {
        self.delete(&format!("/api/persons/{}", id), &format!("Person {}", id))
            .await
    }
}
