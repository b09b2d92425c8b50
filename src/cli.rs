//! Command-line arguments of the `invoice-records` binary.

use clap::{Args, Parser, Subcommand};

use crate::models::{FilterField, FilterSet, InvoiceQuery, SortSpec};

#[derive(Parser)]
#[command(
    name = "invoice-records",
    version,
    about = "Browse and manage invoices and persons of an invoice service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the service (overrides INVOICE_API_URL).
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Invoice listing, detail, deletion and statistics.
    #[command(subcommand)]
    Invoices(InvoiceCommand),

    /// Person listing, detail and deletion.
    #[command(subcommand)]
    Persons(PersonCommand),
}

#[derive(Subcommand)]
pub enum InvoiceCommand {
    List(InvoiceListArgs),
    Show {
        id: i64,
    },
    Delete {
        id: i64,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    Stats,
}

#[derive(Subcommand)]
pub enum PersonCommand {
    List {
        /// Sort as `column,direction`, e.g. `name,desc`.
        #[arg(long, default_value = "id,asc")]
        sort: SortSpec,
    },
    Show {
        id: i64,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct InvoiceListArgs {
    #[arg(long = "min-price")]
    pub min_price: Option<String>,
    #[arg(long = "max-price")]
    pub max_price: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long = "buyer")]
    pub buyer_identification_number: Option<String>,
    #[arg(long = "seller")]
    pub seller_identification_number: Option<String>,
    #[arg(long = "from")]
    pub date_from: Option<String>,
    #[arg(long = "to")]
    pub date_to: Option<String>,

    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    /// Page size (defaults to INVOICE_PAGE_SIZE).
    #[arg(long)]
    pub size: Option<u32>,
    #[arg(long, default_value = "id,asc")]
    pub sort: SortSpec,
}

impl InvoiceListArgs {
    pub fn into_query(self, default_size: u32) -> InvoiceQuery {
        let mut filters = FilterSet::default();
        let values = [
            (FilterField::MinPrice, self.min_price),
            (FilterField::MaxPrice, self.max_price),
            (FilterField::Product, self.product),
            (FilterField::BuyerIdentificationNumber, self.buyer_identification_number),
            (FilterField::SellerIdentificationNumber, self.seller_identification_number),
            (FilterField::DateFrom, self.date_from),
            (FilterField::DateTo, self.date_to),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                filters.set(field, value);
            }
        }

        InvoiceQuery {
            filters,
            sort: self.sort,
            page: self.page,
            size: self.size.unwrap_or(default_size),
        }
    }
}
