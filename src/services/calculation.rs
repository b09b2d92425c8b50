use rust_decimal::Decimal;

use crate::utils::{format_decimal, parse_decimal, round_money};

/// Display-only VAT preview of an invoice form. Never submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedTotals {
    pub vat_amount: Decimal,
    pub total_price: Decimal,
}

impl DerivedTotals {
    pub fn vat_amount_display(&self) -> String {
        format_decimal(self.vat_amount)
    }

    pub fn total_price_display(&self) -> String {
        format_decimal(self.total_price)
    }
}

/// Recomputes the preview from the raw form inputs. Input that does not parse
/// as a number, or whose result does not fit a `Decimal`, zeroes both figures.
pub fn derive_totals(price: &str, vat_rate: &str) -> DerivedTotals {
    let (Ok(price), Ok(rate)) = (parse_decimal(price), parse_decimal(vat_rate)) else {
        return DerivedTotals::default();
    };

    let totals = price
        .checked_mul(rate)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
        .and_then(|vat_amount| {
            let total_price = price.checked_add(vat_amount)?;
            Some(DerivedTotals {
                vat_amount,
                total_price: round_money(total_price),
            })
        });
    totals.unwrap_or_else(|| {
        tracing::debug!("VAT preview out of range");
        DerivedTotals::default()
    })
}
