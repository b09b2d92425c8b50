use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    MinPrice,
    MaxPrice,
    Product,
    BuyerIdentificationNumber,
    SellerIdentificationNumber,
    DateFrom,
    DateTo,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::MinPrice,
        FilterField::MaxPrice,
        FilterField::Product,
        FilterField::BuyerIdentificationNumber,
        FilterField::SellerIdentificationNumber,
        FilterField::DateFrom,
        FilterField::DateTo,
    ];

    /// Query parameter name understood by the invoice listing endpoint.
    pub fn key(self) -> &'static str {
        match self {
            FilterField::MinPrice => "minPrice",
            FilterField::MaxPrice => "maxPrice",
            FilterField::Product => "product",
            FilterField::BuyerIdentificationNumber => "buyerIdentificationNumber",
            FilterField::SellerIdentificationNumber => "sellerIdentificationNumber",
            FilterField::DateFrom => "dateFrom",
            FilterField::DateTo => "dateTo",
        }
    }
}

/// Current filter values. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub product: Option<String>,
    pub buyer_identification_number: Option<String>,
    pub seller_identification_number: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl FilterSet {
    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Blank input clears the constraint.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        let slot = self.slot_mut(field);
        *slot = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Non-empty entries as query pairs. Negative price bounds are dropped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        FilterField::ALL
            .iter()
            .filter_map(|field| {
                let value = self.get(*field)?;
                if matches!(field, FilterField::MinPrice | FilterField::MaxPrice)
                    && is_negative_number(value)
                {
                    tracing::debug!(filter = field.key(), value, "dropping negative price bound");
                    return None;
                }
                let value = match field {
                    FilterField::DateFrom | FilterField::DateTo => {
                        crate::utils::normalize_date(Some(value.to_string()))?
                    }
                    _ => value.to_string(),
                };
                Some((field.key().to_string(), value))
            })
            .collect()
    }

    fn slot(&self, field: FilterField) -> &Option<String> {
        match field {
            FilterField::MinPrice => &self.min_price,
            FilterField::MaxPrice => &self.max_price,
            FilterField::Product => &self.product,
            FilterField::BuyerIdentificationNumber => &self.buyer_identification_number,
            FilterField::SellerIdentificationNumber => &self.seller_identification_number,
            FilterField::DateFrom => &self.date_from,
            FilterField::DateTo => &self.date_to,
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::MinPrice => &mut self.min_price,
            FilterField::MaxPrice => &mut self.max_price,
            FilterField::Product => &mut self.product,
            FilterField::BuyerIdentificationNumber => &mut self.buyer_identification_number,
            FilterField::SellerIdentificationNumber => &mut self.seller_identification_number,
            FilterField::DateFrom => &mut self.date_from,
            FilterField::DateTo => &mut self.date_to,
        }
    }
}

fn is_negative_number(value: &str) -> bool {
    crate::utils::parse_decimal(value)
        .map(|number| number < Decimal::ZERO)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

pub const DEFAULT_SORT_COLUMN: &str = "id";

/// A single active sort column. Defaults to `{id, asc}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec::new(DEFAULT_SORT_COLUMN, SortDirection::Asc)
    }
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            column: column.into(),
            direction,
        }
    }

    /// Next state after a header click: a new column sorts ascending, a second
    /// click on it sorts descending and a third one resets to the default.
    pub fn cycle(&self, column: &str) -> SortSpec {
        if self.column != column {
            return SortSpec::new(column, SortDirection::Asc);
        }
        match self.direction {
            SortDirection::Asc => SortSpec::new(column, SortDirection::Desc),
            SortDirection::Desc => SortSpec::default(),
        }
    }

    pub fn is_default(&self) -> bool {
        *self == SortSpec::default()
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.column, self.direction.as_str())
    }
}

impl FromStr for SortSpec {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match value.split_once(',') {
            Some((column, direction)) => (column.trim(), direction.trim()),
            None => (value.trim(), "asc"),
        };
        if column.is_empty() {
            return Err("sort column is empty".to_string());
        }
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(format!("unknown sort direction '{}'", other)),
        };
        Ok(SortSpec::new(column, direction))
    }
}

/// Everything the invoice listing endpoint needs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub page: u32,
    pub size: u32,
}

impl InvoiceQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.filters.to_query_pairs();
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("size".to_string(), self.size.to_string()));
        pairs.push(("sort".to_string(), self.sort.to_string()));
        pairs
    }
}
