use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

mod query;

pub use query::{FilterField, FilterSet, InvoiceQuery, SortDirection, SortSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub invoice_number: String,
    pub seller: EntityReference,
    pub buyer: EntityReference,
    pub issued: NaiveDate,
    pub due_date: NaiveDate,
    pub product: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub vat: VatRate,
    #[serde(default)]
    pub note: Option<String>,
}

/// The `{id, name}` projection of a person embedded in an invoice.
///
/// The server embeds the whole person here; everything except the id and
/// the name is ignored on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl EntityReference {
    pub fn empty() -> Self {
        EntityReference::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }
}

impl From<&Person> for EntityReference {
    fn from(person: &Person) -> Self {
        EntityReference {
            id: person.id,
            name: person.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VatRate {
    Reduced,
    Standard,
}

impl VatRate {
    pub const ALL: [VatRate; 2] = [VatRate::Reduced, VatRate::Standard];

    pub fn percent(self) -> u8 {
        match self {
            VatRate::Reduced => 12,
            VatRate::Standard => 21,
        }
    }

    pub fn parse(value: &str) -> Option<VatRate> {
        let percent = value.trim().parse::<u8>().ok()?;
        VatRate::try_from(percent).ok()
    }
}

impl TryFrom<u8> for VatRate {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        VatRate::ALL
            .into_iter()
            .find(|rate| rate.percent() == value)
            .ok_or_else(|| format!("unsupported VAT rate {}", value))
    }
}

impl From<VatRate> for u8 {
    fn from(rate: VatRate) -> Self {
        rate.percent()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    #[default]
    Czechia,
    Slovakia,
}

impl Country {
    /// Two-letter prefix used for tax numbers.
    pub fn code(self) -> &'static str {
        match self {
            Country::Czechia => "CZ",
            Country::Slovakia => "SK",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Country::Czechia => "CZECHIA",
            Country::Slovakia => "SLOVAKIA",
        }
    }

    pub fn parse(value: &str) -> Option<Country> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CZECHIA" => Some(Country::Czechia),
            "SLOVAKIA" => Some(Country::Slovakia),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub identification_number: String,
    #[serde(default)]
    pub tax_number: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub bank_code: String,
    #[serde(default)]
    pub iban: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub mail: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: Country,
    #[serde(default)]
    pub note: Option<String>,
}

/// One page of a server-side paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStatistics {
    #[serde(with = "rust_decimal::serde::float")]
    pub all_time_sum: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_year_sum: Decimal,
    pub invoices_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonStatistics {
    pub person_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expenses: Decimal,
}

/// A person row in the listing with its statistics merged in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonRow {
    pub person: Person,
    pub revenue: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetail {
    pub person: Person,
    pub sales: Vec<Invoice>,
    pub purchases: Vec<Invoice>,
    pub invoices_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoice_reads_embedded_person_as_reference() {
        let value = json!({
            "id": 7,
            "invoiceNumber": "2024007",
            "seller": {"id": 1, "name": "Seller s.r.o.", "identificationNumber": "12345678"},
            "buyer": {"id": 2, "name": "Buyer a.s."},
            "issued": "2024-03-01",
            "dueDate": "2024-03-15",
            "product": "Consulting",
            "price": 1500,
            "vat": 21,
            "note": null
        });

        let invoice: Invoice = serde_json::from_value(value).unwrap();
        assert_eq!(invoice.seller.id, Some(1));
        assert_eq!(invoice.seller.name, "Seller s.r.o.");
        assert_eq!(invoice.vat, VatRate::Standard);
        assert_eq!(invoice.price, Decimal::from(1500));
        assert_eq!(invoice.note, None);
    }

    #[test]
    fn unsupported_vat_rate_is_rejected() {
        let value = json!({
            "seller": {}, "buyer": {},
            "issued": "2024-03-01", "dueDate": "2024-03-15",
            "product": "x", "price": 1, "vat": 15
        });
        assert!(serde_json::from_value::<Invoice>(value).is_err());
        assert_eq!(VatRate::parse("12"), Some(VatRate::Reduced));
        assert_eq!(VatRate::parse("abc"), None);
    }

    #[test]
    fn country_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_value(Country::Slovakia).unwrap(), json!("SLOVAKIA"));
        assert_eq!(Country::parse("czechia"), Some(Country::Czechia));
        assert_eq!(Country::Slovakia.code(), "SK");
    }
}
