//! Create/edit form for a person.

use std::sync::Arc;

use crate::api::RecordsApi;
use crate::models::{Country, Person};
use crate::services::invoice_form::FormMode;
use crate::services::validation::{validate_all, validate_on_blur, ValidationErrors, PERSON_RULES};

pub const IDENTIFICATION_NUMBER_LENGTH: usize = 8;

/// Tax number for an identification number of the required length, else empty.
pub fn derive_tax_number(identification_number: &str, country: Country) -> String {
    if identification_number.chars().count() == IDENTIFICATION_NUMBER_LENGTH {
        format!("{}{}", country.code(), identification_number)
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub identification_number: String,
    pub tax_number: String,
    pub account_number: String,
    pub bank_code: String,
    pub iban: String,
    pub telephone: String,
    pub mail: String,
    pub street: String,
    pub zip: String,
    pub city: String,
    pub country: String,
    pub note: String,
}

impl Default for PersonDraft {
    fn default() -> Self {
        PersonDraft {
            name: String::new(),
            identification_number: String::new(),
            tax_number: String::new(),
            account_number: String::new(),
            bank_code: String::new(),
            iban: String::new(),
            telephone: String::new(),
            mail: String::new(),
            street: String::new(),
            zip: String::new(),
            city: String::new(),
            country: Country::default().as_str().to_string(),
            note: String::new(),
        }
    }
}

impl PersonDraft {
    fn from_person(person: &Person) -> Self {
        PersonDraft {
            name: person.name.clone(),
            identification_number: person.identification_number.clone(),
            tax_number: person.tax_number.clone(),
            account_number: person.account_number.clone(),
            bank_code: person.bank_code.clone(),
            iban: person.iban.clone(),
            telephone: person.telephone.clone(),
            mail: person.mail.clone(),
            street: person.street.clone(),
            zip: person.zip.clone(),
            city: person.city.clone(),
            country: person.country.as_str().to_string(),
            note: person.note.clone().unwrap_or_default(),
        }
    }

    fn slot_mut(&mut self, field: &str) -> Option<&mut String> {
        let slot = match field {
            "name" => &mut self.name,
            "identificationNumber" => &mut self.identification_number,
            "taxNumber" => &mut self.tax_number,
            "accountNumber" => &mut self.account_number,
            "bankCode" => &mut self.bank_code,
            "iban" => &mut self.iban,
            "telephone" => &mut self.telephone,
            "mail" => &mut self.mail,
            "street" => &mut self.street,
            "zip" => &mut self.zip,
            "city" => &mut self.city,
            "country" => &mut self.country,
            "note" => &mut self.note,
            _ => return None,
        };
        Some(slot)
    }

    pub fn value_of(&self, field: &str) -> String {
        let value = match field {
            "name" => &self.name,
            "identificationNumber" => &self.identification_number,
            "taxNumber" => &self.tax_number,
            "accountNumber" => &self.account_number,
            "bankCode" => &self.bank_code,
            "iban" => &self.iban,
            "telephone" => &self.telephone,
            "mail" => &self.mail,
            "street" => &self.street,
            "zip" => &self.zip,
            "city" => &self.city,
            "country" => &self.country,
            "note" => &self.note,
            _ => return String::new(),
        };
        value.clone()
    }

    fn country(&self) -> Country {
        Country::parse(&self.country).unwrap_or_default()
    }

    fn refresh_tax_number(&mut self) {
        self.tax_number = derive_tax_number(&self.identification_number, self.country());
    }
}

#[derive(Debug, Clone)]
pub struct PersonFormState {
    mode: FormMode,
    draft: PersonDraft,
    errors: ValidationErrors,
    load_error: Option<String>,
    submit_error: Option<String>,
}

impl PersonFormState {
    pub fn for_create() -> Self {
        PersonFormState {
            mode: FormMode::Create,
            draft: PersonDraft::default(),
            errors: ValidationErrors::new(),
            load_error: None,
            submit_error: None,
        }
    }

    pub fn for_edit(person: &Person) -> Self {
        PersonFormState {
            mode: person.id.map(FormMode::Edit).unwrap_or(FormMode::Create),
            draft: PersonDraft::from_person(person),
            ..PersonFormState::for_create()
        }
    }

    /// Applies one keystroke. The tax number is derived, not typed.
    pub fn change(&mut self, field: &str, value: &str) -> bool {
        if field == "taxNumber" {
            return false;
        }
        let Some(slot) = self.draft.slot_mut(field) else {
            tracing::debug!(field, "unknown person field");
            return false;
        };
        *slot = value.to_string();

        if matches!(field, "identificationNumber" | "country") {
            self.draft.refresh_tax_number();
        }
        self.errors.clear(field);
        true
    }

    pub fn blur(&mut self, field: &str) {
        let value = self.draft.value_of(field);
        validate_on_blur(PERSON_RULES, &mut self.errors, field, &value);
    }

    pub fn validate_for_submit(&mut self) -> Result<Person, Option<&'static str>> {
        let draft = &self.draft;
        self.errors = validate_all(PERSON_RULES, |field| draft.value_of(field));
        if !self.errors.is_empty() {
            return Err(self.errors.first_in(PERSON_RULES));
        }

        let note = self.draft.note.trim();
        Ok(Person {
            id: match self.mode {
                FormMode::Edit(id) => Some(id),
                FormMode::Create => None,
            },
            name: self.draft.name.trim().to_string(),
            identification_number: self.draft.identification_number.trim().to_string(),
            tax_number: self.draft.tax_number.clone(),
            account_number: self.draft.account_number.trim().to_string(),
            bank_code: self.draft.bank_code.trim().to_string(),
            iban: self.draft.iban.trim().to_string(),
            telephone: self.draft.telephone.trim().to_string(),
            mail: self.draft.mail.trim().to_string(),
            street: self.draft.street.trim().to_string(),
            zip: self.draft.zip.trim().to_string(),
            city: self.draft.city.trim().to_string(),
            country: self.draft.country(),
            note: (!note.is_empty()).then(|| note.to_string()),
        })
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &PersonDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersonSubmitOutcome {
    Invalid { first_field: Option<&'static str> },
    Saved(Person),
    Failed(String),
}

pub struct PersonFormSession<A: RecordsApi> {
    api: Arc<A>,
    state: PersonFormState,
}

impl<A: RecordsApi> PersonFormSession<A> {
    pub fn open_create(api: Arc<A>) -> Self {
        PersonFormSession {
            api,
            state: PersonFormState::for_create(),
        }
    }

    pub async fn open_edit(api: Arc<A>, id: i64) -> Self {
        let state = match api.get_person(id).await {
            Ok(person) => PersonFormState::for_edit(&person),
            Err(err) => PersonFormState {
                mode: FormMode::Edit(id),
                load_error: Some(err.user_message("Loading the person")),
                ..PersonFormState::for_create()
            },
        };
        PersonFormSession { api, state }
    }

    pub fn state(&self) -> &PersonFormState {
        &self.state
    }

    pub fn change(&mut self, field: &str, value: &str) -> bool {
        self.state.change(field, value)
    }

    pub fn blur(&mut self, field: &str) {
        self.state.blur(field)
    }

    pub async fn submit(&mut self) -> PersonSubmitOutcome {
        let person = match self.state.validate_for_submit() {
            Ok(person) => person,
            Err(first_field) => return PersonSubmitOutcome::Invalid { first_field },
        };

        let result = match self.state.mode {
            FormMode::Create => self.api.create_person(&person).await,
            FormMode::Edit(id) => self.api.update_person(id, &person).await,
        };
        match result {
            Ok(saved) => {
                tracing::info!(id = ?saved.id, name = %saved.name, "person saved");
                self.state.submit_error = None;
                PersonSubmitOutcome::Saved(saved)
            }
            Err(err) => {
                let message = err.user_message("Saving the person");
                self.state.submit_error = Some(message.clone());
                PersonSubmitOutcome::Failed(message)
            }
        }
    }
}
