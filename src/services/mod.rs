pub mod calculation;
pub mod debounce;
pub mod invoice_form;
pub mod invoice_list;
pub mod list_query;
pub mod person_detail;
pub mod person_form;
pub mod person_list;
pub mod resolver;
pub mod state;
pub mod statistics;
pub mod validation;
