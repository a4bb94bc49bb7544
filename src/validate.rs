use crate::models::{Field, LoanRequest, ValidationErrors};

pub const AMOUNT_MESSAGE: &str = "Loan amount must be greater than 0.";
pub const APR_MESSAGE: &str = "Interest rate must be between 0 and 100.";
pub const TERM_MESSAGE: &str = "Loan term must be between 1 and 480 months.";

pub const MAX_APR: f64 = 100.0;
pub const MAX_TERM_MONTHS: u32 = 480;

/// Turns raw form input into a [`LoanRequest`].
///
/// Every field is checked; all violations are reported together.
pub fn validate(amount: &str, apr: &str, term: &str) -> Result<LoanRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let amount = parse_number(amount).filter(|value| *value > 0.0);
    if amount.is_none() {
        errors.insert(Field::Amount, AMOUNT_MESSAGE);
    }

    let apr = parse_number(apr).filter(|value| (0.0..=MAX_APR).contains(value));
    if apr.is_none() {
        errors.insert(Field::Apr, APR_MESSAGE);
    }

    let term = parse_whole(term).filter(|value| (1..=MAX_TERM_MONTHS).contains(value));
    if term.is_none() {
        errors.insert(Field::Term, TERM_MESSAGE);
    }

    match (amount, apr, term) {
        (Some(amount), Some(apr), Some(term_months)) => Ok(LoanRequest {
            amount,
            apr,
            term_months,
        }),
        _ => Err(errors),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

// "360" and "360.0" are whole; "360.5" is not.
fn parse_whole(raw: &str) -> Option<u32> {
    let value = parse_number(raw)?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}
