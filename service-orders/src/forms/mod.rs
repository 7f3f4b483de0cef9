//! Form validation
//!
//! Forms arrive as raw strings. Each form validates into the matching
//! repository input before anything touches the store; a rejected field is
//! reported as [`AppError::Validation`] naming it.

pub mod customer;
pub mod order;
pub mod service_type;

pub use customer::CustomerForm;
pub use order::ServiceOrderForm;
pub use service_type::ServiceTypeForm;

use crate::error::{AppError, Result};
use chrono::NaiveDate;

/// Date format used by every date field shown to the user
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Trimmed text, `None` when nothing is left
pub(crate) fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Trimmed text that must not be empty
pub(crate) fn required(field: &'static str, value: &str) -> Result<String> {
    optional(value).ok_or_else(|| AppError::validation(field, "required"))
}

/// `DD/MM/YYYY`, empty meaning no date
pub fn parse_display_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>> {
    let Some(value) = optional(value) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(&value, DISPLAY_DATE_FORMAT)
        .map(Some)
        .map_err(|_| AppError::validation(field, format!("expected DD/MM/YYYY, got {:?}", value)))
}

/// Monetary amount as typed: an optional `R$ ` prefix and either `.` or
/// `,` as decimal separator. Thousands separators are not accepted.
pub fn parse_money(field: &'static str, value: &str) -> Result<Option<f64>> {
    let cleaned = value.replace("R$ ", "").replace(',', ".");
    let Some(cleaned) = optional(&cleaned) else {
        return Ok(None);
    };

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(Some(amount)),
        _ => Err(AppError::validation(
            field,
            format!("not a valid amount: {:?}", value.trim()),
        )),
    }
}

/// Integer identifier, empty meaning none
pub(crate) fn parse_id(field: &'static str, value: &str) -> Result<Option<i64>> {
    let Some(value) = optional(value) else {
        return Ok(None);
    };

    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::validation(field, format!("not a valid id: {:?}", value)))
}
