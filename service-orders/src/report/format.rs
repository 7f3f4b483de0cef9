//! Display formatting for report fields
//!
//! Money is always rendered the Brazilian way (`R$ 1.234,50`) whatever the
//! host locale is.

use crate::config::MAX_FILENAME_CUSTOMER_CHARS;
use crate::database::{CustomerContact, StoredValue};

pub const NOT_AVAILABLE: &str = "N/A";
pub const INVALID_VALUE: &str = "Inválido";
pub const SAME_AS_CUSTOMER: &str = "Mesmo do cliente";
pub const PENDING: &str = "Pendente";
pub const NO_DESCRIPTION: &str = "Nenhuma descrição.";
pub const NO_NOTES: &str = "Nenhuma observação.";

/// `R$` amount with two decimals, `.` for thousands and `,` for decimals
pub fn format_brl(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let negative = amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    format!("R$ {}{},{}", sign, grouped, cents)
}

/// Stored order value as shown in the report
pub fn format_value(value: &StoredValue) -> String {
    match value {
        StoredValue::Absent => NOT_AVAILABLE.to_string(),
        StoredValue::Amount(amount) if amount.is_finite() => format_brl(*amount),
        StoredValue::Amount(_) | StoredValue::Unparseable(_) => INVALID_VALUE.to_string(),
    }
}

/// The value when it has visible content, the fallback otherwise
pub fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

/// Single line customer address: `street, number, city - state`
pub fn compose_address(contact: &CustomerContact) -> String {
    let parts: Vec<&str> = [&contact.street, &contact.number, &contact.city]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect();

    let mut address = parts.join(", ");

    if let Some(state) = contact.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if address.is_empty() {
            address.push_str(state);
        } else {
            address.push_str(" - ");
            address.push_str(state);
        }
    }

    if address.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        address
    }
}

/// Keep only characters safe in a file name: alphanumerics, space, `.` and `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Customer part of a suggested report name
pub fn filename_customer_part(name: &str) -> String {
    sanitize_filename(name)
        .chars()
        .take(MAX_FILENAME_CUSTOMER_CHARS)
        .collect()
}
