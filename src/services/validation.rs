//! Field rules shared by the invoice and person forms.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{Country, VatRate};
use crate::utils::{parse_date, parse_decimal};

pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ExactLength(usize, &'static str),
    ExactDigits(usize, &'static str),
    Contains(char, &'static str),
    NonNegativeNumber(&'static str),
    VatRate(&'static str),
    Country(&'static str),
    Date(&'static str),
}

impl Rule {
    fn check(&self, value: &str) -> Option<&'static str> {
        let ok = match *self {
            Rule::ExactLength(len, _) => value.chars().count() == len,
            Rule::ExactDigits(len, _) => {
                value.len() == len && value.chars().all(|c| c.is_ascii_digit())
            }
            Rule::Contains(needle, _) => value.contains(needle),
            Rule::NonNegativeNumber(_) => parse_decimal(value)
                .map(|number| number >= Decimal::ZERO)
                .unwrap_or(false),
            Rule::VatRate(_) => VatRate::parse(value).is_some(),
            Rule::Country(_) => Country::parse(value).is_some(),
            Rule::Date(_) => parse_date(value).is_some(),
        };
        if ok {
            None
        } else {
            Some(self.message())
        }
    }

    fn message(&self) -> &'static str {
        match *self {
            Rule::ExactLength(_, message)
            | Rule::ExactDigits(_, message)
            | Rule::Contains(_, message)
            | Rule::NonNegativeNumber(message)
            | Rule::VatRate(message)
            | Rule::Country(message)
            | Rule::Date(message) => message,
        }
    }
}

/// Rules of one form field. Optional fields are skipped on submit.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub required: bool,
    pub rules: &'static [Rule],
}

impl FieldRules {
    const fn required(field: &'static str, rules: &'static [Rule]) -> Self {
        FieldRules {
            field,
            required: true,
            rules,
        }
    }

    const fn optional(field: &'static str) -> Self {
        FieldRules {
            field,
            required: false,
            rules: &[],
        }
    }

    pub fn validate(&self, value: &str) -> Option<String> {
        if value.trim().is_empty() {
            return self.required.then(|| REQUIRED_MESSAGE.to_string());
        }
        self.rules
            .iter()
            .find_map(|rule| rule.check(value))
            .map(str::to_string)
    }
}

pub const PERSON_RULES: &[FieldRules] = &[
    FieldRules::required("name", &[]),
    FieldRules::required(
        "identificationNumber",
        &[Rule::ExactLength(8, "Identification number must have exactly 8 characters.")],
    ),
    FieldRules::required("taxNumber", &[]),
    FieldRules::required("accountNumber", &[]),
    FieldRules::required("bankCode", &[]),
    FieldRules::required("iban", &[]),
    FieldRules::required("telephone", &[Rule::ExactDigits(9, "Telephone must have exactly 9 digits.")]),
    FieldRules::required("mail", &[Rule::Contains('@', "E-mail must contain the @ character.")]),
    FieldRules::required("street", &[]),
    FieldRules::required("zip", &[Rule::ExactDigits(5, "Zip code must have exactly 5 digits.")]),
    FieldRules::required("city", &[]),
    FieldRules::required("country", &[Rule::Country("Country must be CZECHIA or SLOVAKIA.")]),
    FieldRules::optional("note"),
];

pub const INVOICE_RULES: &[FieldRules] = &[
    FieldRules::required("invoiceNumber", &[]),
    FieldRules::required("sellerId", &[]),
    FieldRules::required("buyerId", &[]),
    FieldRules::required("issued", &[Rule::Date("Issue date must be a valid date.")]),
    FieldRules::required("dueDate", &[Rule::Date("Due date must be a valid date.")]),
    FieldRules::required("product", &[]),
    FieldRules::required("price", &[Rule::NonNegativeNumber("Price must be a non-negative number.")]),
    FieldRules::required("vat", &[Rule::VatRate("VAT rate must be 12 or 21.")]),
    FieldRules::optional("note"),
];

pub fn rules_for(table: &'static [FieldRules], field: &str) -> Option<&'static FieldRules> {
    table.iter().find(|rules| rules.field == field)
}

/// Error message per field. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors::default()
    }

    /// Stores `message` for `field`, or clears the field when it is `None` or empty.
    pub fn set(&mut self, field: &str, message: Option<String>) {
        match message.filter(|m| !m.is_empty()) {
            Some(message) => {
                self.entries.insert(field.to_string(), message);
            }
            None => {
                self.entries.remove(field);
            }
        }
    }

    pub fn clear(&mut self, field: &str) {
        self.entries.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// First invalid field in the order the form lays its fields out.
    pub fn first_in(&self, table: &'static [FieldRules]) -> Option<&'static str> {
        table
            .iter()
            .map(|rules| rules.field)
            .find(|field| self.contains(field))
    }
}

/// Blur-time check of a single field; only that field's entry changes.
pub fn validate_on_blur(
    table: &'static [FieldRules],
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) {
    match rules_for(table, field) {
        Some(rules) => errors.set(field, rules.validate(value)),
        None => tracing::debug!(field, "no rules for field"),
    }
}

/// Submit-time check of every required field. `value_of` supplies the
/// current raw value of each field.
pub fn validate_all<F>(table: &'static [FieldRules], value_of: F) -> ValidationErrors
where
    F: Fn(&str) -> String,
{
    let mut errors = ValidationErrors::new();
    for rules in table.iter().filter(|rules| rules.required) {
        errors.set(rules.field, rules.validate(&value_of(rules.field)));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_rule(field: &str) -> &'static FieldRules {
        rules_for(PERSON_RULES, field).unwrap()
    }

    #[test]
    fn identification_number_needs_eight_characters() {
        let rules = person_rule("identificationNumber");
        assert!(rules.validate("1234567").is_some());
        assert!(rules.validate("12345678").is_none());
    }

    #[test]
    fn zip_and_telephone_need_exact_digit_counts() {
        assert!(person_rule("zip").validate("1100").is_some());
        assert!(person_rule("zip").validate("11a00").is_some());
        assert!(person_rule("zip").validate("11000").is_none());
        assert!(person_rule("telephone").validate("77712345").is_some());
        assert!(person_rule("telephone").validate("777123456").is_none());
    }

    #[test]
    fn mail_needs_at_sign() {
        assert_eq!(
            person_rule("mail").validate("jan.example.cz").as_deref(),
            Some("E-mail must contain the @ character.")
        );
        assert!(person_rule("mail").validate("jan@example.cz").is_none());
    }

    #[test]
    fn blank_required_field_reports_required_message() {
        assert_eq!(person_rule("city").validate("  ").as_deref(), Some(REQUIRED_MESSAGE));
        assert!(person_rule("note").validate("").is_none());
    }

    #[test]
    fn price_and_vat_rules() {
        let price = rules_for(INVOICE_RULES, "price").unwrap();
        assert!(price.validate("-1").is_some());
        assert!(price.validate("abc").is_some());
        assert!(price.validate("0").is_none());

        let vat = rules_for(INVOICE_RULES, "vat").unwrap();
        assert!(vat.validate("15").is_some());
        assert!(vat.validate("21").is_none());
    }

    #[test]
    fn blur_touches_only_the_blurred_field() {
        let mut errors = ValidationErrors::new();
        errors.set("city", Some(REQUIRED_MESSAGE.to_string()));

        validate_on_blur(PERSON_RULES, &mut errors, "zip", "12");
        assert!(errors.contains("zip"));
        assert!(errors.contains("city"));

        validate_on_blur(PERSON_RULES, &mut errors, "zip", "12345");
        assert!(!errors.contains("zip"));
        assert!(errors.contains("city"));
    }

    #[test]
    fn submit_skips_optional_fields_and_orders_by_form() {
        let errors = validate_all(PERSON_RULES, |field| match field {
            "zip" | "mail" => String::new(),
            _ => "12345678".to_string(),
        });
        let fields: Vec<&str> = errors.fields().collect();
        assert!(fields.contains(&"zip"));
        assert!(fields.contains(&"mail"));
        assert!(fields.contains(&"telephone"));
        assert!(!fields.contains(&"note"));
        assert_eq!(errors.first_in(PERSON_RULES), Some("telephone"));
    }
}
