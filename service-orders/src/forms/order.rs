//! Service order form

use super::{optional, parse_display_date, parse_id, parse_money, required};
use crate::database::{OrderStatus, ServiceOrderInput, ENTRY_DATE_FORMAT};
use crate::error::{AppError, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Service order fields as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOrderForm {
    pub order_number: String,
    pub customer_id: String,
    pub service_type_id: String,
    /// `YYYY-MM-DD HH:MM:SS`; blank means now
    pub entry_date: String,
    pub problem_description: String,
    pub service_address: String,
    pub warranty: String,
    pub status: String,
    /// Reference returned by the uploads store, if a photo was attached
    pub photo_path: String,
    /// `DD/MM/YYYY`
    pub completion_date: String,
    /// `R$ 150,00`, `150,00` or `150.00`
    pub value: String,
    pub notes: String,
}

impl ServiceOrderForm {
    pub fn validate(&self) -> Result<ServiceOrderInput> {
        self.validate_at(Local::now().naive_local())
    }

    /// Validate with `now` as the entry date of a form that has none
    pub fn validate_at(&self, now: NaiveDateTime) -> Result<ServiceOrderInput> {
        let order_number = required("order_number", &self.order_number)?;
        let customer_id = parse_id("customer", &self.customer_id)?
            .ok_or_else(|| AppError::validation("customer", "required"))?;
        let status = required("status", &self.status)?;

        if OrderStatus::from_stored(&status).is_none() {
            return Err(AppError::validation(
                "status",
                format!("unknown status {:?}", status),
            ));
        }

        let entry_date = match optional(&self.entry_date) {
            None => now,
            Some(text) => NaiveDateTime::parse_from_str(&text, ENTRY_DATE_FORMAT).map_err(|_| {
                AppError::validation(
                    "entry_date",
                    format!("expected YYYY-MM-DD HH:MM:SS, got {:?}", text),
                )
            })?,
        };

        Ok(ServiceOrderInput {
            order_number,
            customer_id,
            service_type_id: parse_id("service_type", &self.service_type_id)?,
            entry_date,
            problem_description: optional(&self.problem_description),
            service_address: optional(&self.service_address),
            warranty: optional(&self.warranty),
            status,
            photo_path: optional(&self.photo_path),
            completion_date: parse_display_date("completion_date", &self.completion_date)?,
            value: parse_money("value", &self.value)?,
            notes: optional(&self.notes),
        })
    }
}
