//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to a UI layer.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Storage format of `service_orders.entry_date`
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Storage format of `service_orders.completion_date`
pub const COMPLETION_DATE_FORMAT: &str = "%Y-%m-%d";

/// A customer of the repair shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// CPF or CNPJ, unique when present
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// Create or update customer request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// A category of service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Lifecycle states offered for a service order.
///
/// The store keeps the status as free text; these are the values the
/// application writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Open,
    InProgress,
    AwaitingParts,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Open,
        OrderStatus::InProgress,
        OrderStatus::AwaitingParts,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Stored representation
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "Aberta",
            OrderStatus::InProgress => "Em Andamento",
            OrderStatus::AwaitingParts => "Aguardando Peças",
            OrderStatus::Completed => "Concluída",
            OrderStatus::Cancelled => "Cancelada",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monetary value as found in the store.
///
/// The column is `REAL` but SQLite keeps text that cannot be coerced, so a
/// row may carry something that is not a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredValue {
    Absent,
    Amount(f64),
    Unparseable(String),
}

impl StoredValue {
    fn decode(row: &SqliteRow, column: &str) -> Self {
        if let Ok(amount) = row.try_get::<Option<f64>, _>(column) {
            return amount.map_or(StoredValue::Absent, StoredValue::Amount);
        }

        match row.try_get::<Option<String>, _>(column) {
            Ok(None) => StoredValue::Absent,
            Ok(Some(text)) => match text.trim().parse::<f64>() {
                Ok(amount) => StoredValue::Amount(amount),
                Err(_) => StoredValue::Unparseable(text),
            },
            Err(_) => StoredValue::Unparseable(String::new()),
        }
    }
}

impl From<Option<f64>> for StoredValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(StoredValue::Absent, StoredValue::Amount)
    }
}

/// A service order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: i64,
    /// Human-facing number, unique across orders
    pub order_number: String,
    pub customer_id: i64,
    pub service_type_id: Option<i64>,
    /// `YYYY-MM-DD HH:MM:SS`
    pub entry_date: String,
    pub problem_description: Option<String>,
    /// Site of the service when it differs from the customer address
    pub service_address: Option<String>,
    pub warranty: Option<String>,
    pub status: Option<String>,
    /// Name of the photo inside the uploads directory
    pub photo_path: Option<String>,
    pub completion_date: Option<String>,
    pub value: StoredValue,
    pub notes: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for ServiceOrder {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            customer_id: row.try_get("customer_id")?,
            service_type_id: row.try_get("service_type_id")?,
            entry_date: row.try_get("entry_date")?,
            problem_description: row.try_get("problem_description")?,
            service_address: row.try_get("service_address")?,
            warranty: row.try_get("warranty")?,
            status: row.try_get("status")?,
            photo_path: row.try_get("photo_path")?,
            completion_date: row.try_get("completion_date")?,
            value: StoredValue::decode(row, "value"),
            notes: row.try_get("notes")?,
        })
    }
}

/// Customer fields carried alongside an order for display.
/// Every field is absent when the order's customer no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A service order joined with its customer and service type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedServiceOrder {
    pub order: ServiceOrder,
    pub customer: CustomerContact,
    pub service_type_name: Option<String>,
    /// Set when the stored row could not be decoded. Only `order.id` is
    /// meaningful then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl EnrichedServiceOrder {
    /// Placeholder for a row whose fields could not be read
    pub fn unreadable(id: i64, error: impl Into<String>) -> Self {
        Self {
            order: ServiceOrder {
                id,
                order_number: String::new(),
                customer_id: 0,
                service_type_id: None,
                entry_date: String::new(),
                problem_description: None,
                service_address: None,
                warranty: None,
                status: None,
                photo_path: None,
                completion_date: None,
                value: StoredValue::Absent,
                notes: None,
            },
            customer: CustomerContact::default(),
            service_type_name: None,
            load_error: Some(error.into()),
        }
    }

    /// Decode a joined row. A row that fails to decode is kept as an
    /// [`EnrichedServiceOrder::unreadable`] record so its neighbours survive.
    pub fn decode_lenient(row: &SqliteRow) -> Self {
        match Self::from_row(row) {
            Ok(record) => record,
            Err(e) => {
                let id = row.try_get::<i64, _>("id").unwrap_or_default();
                tracing::error!("Could not decode service order {}: {}", id, e);
                Self::unreadable(id, e.to_string())
            }
        }
    }

    pub fn is_readable(&self) -> bool {
        self.load_error.is_none()
    }
}

impl<'r> FromRow<'r, SqliteRow> for EnrichedServiceOrder {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            order: ServiceOrder::from_row(row)?,
            customer: CustomerContact {
                name: row.try_get("customer_name")?,
                street: row.try_get("customer_street")?,
                number: row.try_get("customer_number")?,
                complement: row.try_get("customer_complement")?,
                neighborhood: row.try_get("customer_neighborhood")?,
                city: row.try_get("customer_city")?,
                state: row.try_get("customer_state")?,
                postal_code: row.try_get("customer_postal_code")?,
                phone: row.try_get("customer_phone")?,
                email: row.try_get("customer_email")?,
            },
            service_type_name: row.try_get("service_type_name")?,
            load_error: None,
        })
    }
}

/// Create or update service order request
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOrderInput {
    pub order_number: String,
    pub customer_id: i64,
    pub service_type_id: Option<i64>,
    pub entry_date: NaiveDateTime,
    pub problem_description: Option<String>,
    pub service_address: Option<String>,
    pub warranty: Option<String>,
    pub status: String,
    pub photo_path: Option<String>,
    pub completion_date: Option<NaiveDate>,
    pub value: Option<f64>,
    pub notes: Option<String>,
}

impl ServiceOrderInput {
    /// A new open order with only the required fields set
    pub fn new(order_number: impl Into<String>, customer_id: i64, entry_date: NaiveDateTime) -> Self {
        Self {
            order_number: order_number.into(),
            customer_id,
            service_type_id: None,
            entry_date,
            problem_description: None,
            service_address: None,
            warranty: None,
            status: OrderStatus::Open.as_str().to_string(),
            photo_path: None,
            completion_date: None,
            value: None,
            notes: None,
        }
    }

    pub(crate) fn entry_date_text(&self) -> String {
        self.entry_date.format(ENTRY_DATE_FORMAT).to_string()
    }

    pub(crate) fn completion_date_text(&self) -> Option<String> {
        self.completion_date
            .map(|date| date.format(COMPLETION_DATE_FORMAT).to_string())
    }
}
