//! Create/edit form for a single invoice.

use std::sync::Arc;

use crate::api::RecordsApi;
use crate::models::{EntityReference, Invoice, Person, SortDirection, SortSpec, VatRate};
use crate::services::calculation::{derive_totals, DerivedTotals};
use crate::services::resolver::resolve_reference;
use crate::services::validation::{rules_for, ValidationErrors, INVOICE_RULES};
use crate::utils::{parse_date, parse_decimal};

const SELLER_MISSING: &str = "Select the seller.";
const BUYER_MISSING: &str = "Select the buyer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Raw form values, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    pub seller: EntityReference,
    pub buyer: EntityReference,
    pub issued: String,
    pub due_date: String,
    pub product: String,
    pub price: String,
    pub vat: String,
    pub note: String,
}

impl InvoiceDraft {
    fn from_invoice(invoice: &Invoice) -> Self {
        InvoiceDraft {
            invoice_number: invoice.invoice_number.clone(),
            seller: invoice.seller.clone(),
            buyer: invoice.buyer.clone(),
            issued: invoice.issued.format("%Y-%m-%d").to_string(),
            due_date: invoice.due_date.format("%Y-%m-%d").to_string(),
            product: invoice.product.clone(),
            price: invoice.price.normalize().to_string(),
            vat: invoice.vat.percent().to_string(),
            note: invoice.note.clone().unwrap_or_default(),
        }
    }

    pub fn value_of(&self, field: &str) -> String {
        match field {
            "invoiceNumber" => self.invoice_number.clone(),
            "sellerId" => reference_id(&self.seller),
            "buyerId" => reference_id(&self.buyer),
            "issued" => self.issued.clone(),
            "dueDate" => self.due_date.clone(),
            "product" => self.product.clone(),
            "price" => self.price.clone(),
            "vat" => self.vat.clone(),
            "note" => self.note.clone(),
            _ => String::new(),
        }
    }
}

fn reference_id(reference: &EntityReference) -> String {
    reference.id.map(|id| id.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Invalid { first_field: Option<&'static str> },
    /// Saved remotely; the caller returns to the listing.
    Saved(Invoice),
    /// The remote call failed; the draft is kept.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct InvoiceFormState {
    mode: FormMode,
    draft: InvoiceDraft,
    errors: ValidationErrors,
    totals: DerivedTotals,
    persons: Vec<Person>,
    load_error: Option<String>,
    submit_error: Option<String>,
}

impl InvoiceFormState {
    pub fn for_create(invoice_number: String) -> Self {
        let draft = InvoiceDraft {
            invoice_number,
            ..InvoiceDraft::default()
        };
        Self::with_draft(FormMode::Create, draft)
    }

    pub fn for_edit(invoice: &Invoice) -> Self {
        let mode = match invoice.id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };
        Self::with_draft(mode, InvoiceDraft::from_invoice(invoice))
    }

    fn with_draft(mode: FormMode, draft: InvoiceDraft) -> Self {
        let totals = derive_totals(&draft.price, &draft.vat);
        InvoiceFormState {
            mode,
            draft,
            errors: ValidationErrors::new(),
            totals,
            persons: Vec::new(),
            load_error: None,
            submit_error: None,
        }
    }

    pub fn set_persons(&mut self, persons: Vec<Person>) {
        self.persons = persons;
    }

    /// Applies one keystroke/selection. Returns `false` when the field cannot
    /// be edited.
    pub fn change(&mut self, field: &str, value: &str) -> bool {
        match field {
            "invoiceNumber" => {
                if !self.draft.invoice_number.is_empty() {
                    return false;
                }
                self.draft.invoice_number = value.to_string();
            }
            "sellerId" => self.draft.seller = resolve_reference(&self.persons, value),
            "buyerId" => self.draft.buyer = resolve_reference(&self.persons, value),
            "issued" => self.draft.issued = value.to_string(),
            "dueDate" => self.draft.due_date = value.to_string(),
            "product" => self.draft.product = value.to_string(),
            "price" => self.draft.price = value.to_string(),
            "vat" => self.draft.vat = value.to_string(),
            "note" => self.draft.note = value.to_string(),
            _ => {
                tracing::debug!(field, "unknown invoice field");
                return false;
            }
        }
        if matches!(field, "price" | "vat") {
            self.totals = derive_totals(&self.draft.price, &self.draft.vat);
        }
        self.errors.clear(field);
        true
    }

    pub fn blur(&mut self, field: &str) {
        if rules_for(INVOICE_RULES, field).is_some() {
            let error = self.field_error(field);
            self.errors.set(field, error);
        }
    }

    /// Runs every submit-time check. On success returns the record to send.
    pub fn validate_for_submit(&mut self) -> Result<Invoice, Option<&'static str>> {
        let mut errors = ValidationErrors::new();
        for rules in INVOICE_RULES.iter().filter(|rules| rules.required) {
            errors.set(rules.field, self.field_error(rules.field));
        }
        self.errors = errors;

        if !self.errors.is_empty() {
            return Err(self.errors.first_in(INVOICE_RULES));
        }
        self.to_invoice().ok_or(None)
    }

    fn field_error(&self, field: &str) -> Option<String> {
        match field {
            "sellerId" => self.draft.seller.is_empty().then(|| SELLER_MISSING.to_string()),
            "buyerId" => self.draft.buyer.is_empty().then(|| BUYER_MISSING.to_string()),
            _ => rules_for(INVOICE_RULES, field)?.validate(&self.draft.value_of(field)),
        }
    }

    fn to_invoice(&self) -> Option<Invoice> {
        let note = self.draft.note.trim();
        Some(Invoice {
            id: match self.mode {
                FormMode::Edit(id) => Some(id),
                FormMode::Create => None,
            },
            invoice_number: self.draft.invoice_number.trim().to_string(),
            seller: self.draft.seller.clone(),
            buyer: self.draft.buyer.clone(),
            issued: parse_date(&self.draft.issued)?,
            due_date: parse_date(&self.draft.due_date)?,
            product: self.draft.product.trim().to_string(),
            price: parse_decimal(&self.draft.price).ok()?,
            vat: VatRate::parse(&self.draft.vat)?,
            note: (!note.is_empty()).then(|| note.to_string()),
        })
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn totals(&self) -> DerivedTotals {
        self.totals
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }
}

/// An invoice form bound to the remote service.
pub struct InvoiceFormSession<A: RecordsApi> {
    api: Arc<A>,
    state: InvoiceFormState,
}

impl<A: RecordsApi> InvoiceFormSession<A> {
    /// Fresh form with a server-issued invoice number.
    pub async fn open_create(api: Arc<A>) -> Self {
        let order = person_order();
        let (persons, number) = tokio::join!(api.list_persons(&order), api.next_invoice_number());

        let mut load_errors = Vec::new();
        let number = number.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "next invoice number unavailable");
            load_errors.push(err.user_message("Loading the next invoice number"));
            String::new()
        });
        let mut state = InvoiceFormState::for_create(number);
        state.set_persons(persons.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "persons for the form unavailable");
            load_errors.push(err.user_message("Loading persons"));
            Vec::new()
        }));
        if !load_errors.is_empty() {
            state.load_error = Some(load_errors.join(" "));
        }

        InvoiceFormSession { api, state }
    }

    /// Form hydrated from an existing invoice.
    pub async fn open_edit(api: Arc<A>, id: i64) -> Self {
        let order = person_order();
        let (persons, invoice) = tokio::join!(api.list_persons(&order), api.get_invoice(id));

        let mut state = match invoice {
            Ok(invoice) => InvoiceFormState::for_edit(&invoice),
            Err(err) => {
                let mut state = InvoiceFormState::with_draft(FormMode::Edit(id), InvoiceDraft::default());
                state.load_error = Some(err.user_message("Loading the invoice"));
                state
            }
        };
        match persons {
            Ok(persons) => state.set_persons(persons),
            Err(err) => {
                tracing::warn!(error = %err, "persons for the form unavailable");
                let message = err.user_message("Loading persons");
                state.load_error = Some(match state.load_error.take() {
                    Some(previous) => format!("{} {}", previous, message),
                    None => message,
                });
            }
        }

        InvoiceFormSession { api, state }
    }

    pub fn state(&self) -> &InvoiceFormState {
        &self.state
    }

    pub fn change(&mut self, field: &str, value: &str) -> bool {
        self.state.change(field, value)
    }

    pub fn blur(&mut self, field: &str) {
        self.state.blur(field)
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let invoice = match self.state.validate_for_submit() {
            Ok(invoice) => invoice,
            Err(first_field) => return SubmitOutcome::Invalid { first_field },
        };

        let result = match self.state.mode {
            FormMode::Create => self.api.create_invoice(&invoice).await,
            FormMode::Edit(id) => self.api.update_invoice(id, &invoice).await,
        };
        match result {
            Ok(saved) => {
                tracing::info!(id = ?saved.id, number = %saved.invoice_number, "invoice saved");
                self.state.submit_error = None;
                SubmitOutcome::Saved(saved)
            }
            Err(err) => {
                let message = err.user_message("Saving the invoice");
                self.state.submit_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}

fn person_order() -> SortSpec {
    SortSpec::new("name", SortDirection::Asc)
}
