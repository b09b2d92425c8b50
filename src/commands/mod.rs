pub mod invoices;
pub mod persons;
