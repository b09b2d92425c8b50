use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use invoice_records::cli::{Cli, Command, InvoiceCommand, PersonCommand};
use invoice_records::commands::{invoices, persons};
use invoice_records::config::ClientConfig;
use invoice_records::models::{Invoice, InvoiceStatistics, PersonDetail, PersonRow};
use invoice_records::services::invoice_list::InvoiceListView;
use invoice_records::services::state::AppState;
use invoice_records::utils::format_decimal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url.clone() {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    let state = AppState::connect(config)?;
    let json = cli.json;

    match cli.command {
        Command::Invoices(command) => match command {
            InvoiceCommand::List(args) => {
                let query = args.into_query(state.config.page_size);
                let view = invoices::get_invoices(query, &state).await.map_err(|e| anyhow!(e))?;
                emit(json, &view.rows, || print_invoice_page(&view))
            }
            InvoiceCommand::Show { id } => {
                let invoice = invoices::get_invoice_detail(id, &state)
                    .await
                    .map_err(|e| anyhow!(e))?;
                emit(json, &invoice, || print_invoice(&invoice))
            }
            InvoiceCommand::Delete { id, yes } => {
                let view = invoices::delete_invoice(id, yes, &state)
                    .await
                    .map_err(|e| anyhow!(e))?;
                emit(json, &view.rows, || print_invoice_page(&view))
            }
            InvoiceCommand::Stats => {
                let stats = invoices::get_invoice_statistics(&state)
                    .await
                    .map_err(|e| anyhow!(e))?;
                emit(json, &stats, || print_statistics(&stats))
            }
        },
        Command::Persons(command) => match command {
            PersonCommand::List { sort } => {
                let rows = persons::get_persons(sort, &state).await.map_err(|e| anyhow!(e))?;
                emit(json, &rows, || print_person_rows(&rows))
            }
            PersonCommand::Show { id } => {
                let detail = persons::get_person_detail(id, &state)
                    .await
                    .map_err(|e| anyhow!(e))?;
                emit(json, &detail, || print_person_detail(&detail))
            }
            PersonCommand::Delete { id, yes } => {
                let rows = persons::delete_person(id, yes, &state)
                    .await
                    .map_err(|e| anyhow!(e))?;
                emit(json, &rows, || print_person_rows(&rows))
            }
        },
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn print_invoice_page(view: &InvoiceListView) {
    for invoice in &view.rows {
        println!(
            "{:>6}  {:<12} {:<24} {:>12}  {} -> {}",
            invoice.id.map(|id| id.to_string()).unwrap_or_default(),
            invoice.invoice_number,
            invoice.product,
            format_decimal(invoice.price),
            invoice.seller.name,
            invoice.buyer.name
        );
    }
    println!(
        "page {}/{} ({} invoices, sort {})",
        view.query.page + 1,
        view.total_pages.max(1),
        view.total_elements,
        view.query.sort
    );
    print_statistics(&view.statistics);
    if let Some(message) = &view.statistics_error {
        println!("{}", message);
    }
}

fn print_invoice(invoice: &Invoice) {
    println!("Invoice {}", invoice.invoice_number);
    println!("  seller:   {}", invoice.seller.name);
    println!("  buyer:    {}", invoice.buyer.name);
    println!("  issued:   {}", invoice.issued);
    println!("  due:      {}", invoice.due_date);
    println!("  product:  {}", invoice.product);
    println!("  price:    {}", format_decimal(invoice.price));
    println!("  VAT:      {} %", invoice.vat.percent());
    if let Some(note) = &invoice.note {
        println!("  note:     {}", note);
    }
}

fn print_statistics(stats: &InvoiceStatistics) {
    println!(
        "current year {} | all time {} | {} invoices",
        format_decimal(stats.current_year_sum),
        format_decimal(stats.all_time_sum),
        stats.invoices_count
    );
}

fn print_person_rows(rows: &[PersonRow]) {
    for row in rows {
        println!(
            "{:>6}  {:<30} {:<10} {:>12} {:>12}",
            row.person.id.map(|id| id.to_string()).unwrap_or_default(),
            row.person.name,
            row.person.identification_number,
            format_decimal(row.revenue),
            format_decimal(row.expenses)
        );
    }
}

fn print_person_detail(detail: &PersonDetail) {
    let person = &detail.person;
    println!("{} ({})", person.name, person.identification_number);
    println!("  tax number: {}", person.tax_number);
    println!("  account:    {}/{} ({})", person.account_number, person.bank_code, person.iban);
    println!("  contact:    {} {}", person.telephone, person.mail);
    println!("  address:    {}, {} {}, {}", person.street, person.zip, person.city, person.country.as_str());
    if let Some(message) = &detail.invoices_error {
        println!("{}", message);
    }
    println!("Sales: {}", detail.sales.len());
    for invoice in &detail.sales {
        println!("  {} {} {}", invoice.invoice_number, invoice.product, format_decimal(invoice.price));
    }
    println!("Purchases: {}", detail.purchases.len());
    for invoice in &detail.purchases {
        println!("  {} {} {}", invoice.invoice_number, invoice.product, format_decimal(invoice.price));
    }
}
