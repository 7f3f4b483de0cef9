//! Report filter composition
//!
//! Optional criteria are turned into a list of predicates which are then
//! compiled into a single parameterized statement. Values only ever reach
//! the statement as bound parameters.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

/// Base statement shared by every enriched order read.
///
/// Outer joins keep orders whose customer or service type is gone.
pub(crate) const ENRICHED_SELECT: &str = r#"
    SELECT os.*,
           c.name AS customer_name,
           c.street AS customer_street,
           c.number AS customer_number,
           c.complement AS customer_complement,
           c.neighborhood AS customer_neighborhood,
           c.city AS customer_city,
           c.state AS customer_state,
           c.postal_code AS customer_postal_code,
           c.phone AS customer_phone,
           c.email AS customer_email,
           ts.name AS service_type_name
    FROM service_orders os
    LEFT JOIN customers c ON os.customer_id = c.id
    LEFT JOIN service_types ts ON os.service_type_id = ts.id
"#;

/// Most recent first, insertion order among equal timestamps
pub(crate) const ENRICHED_ORDER_BY: &str = " ORDER BY os.entry_date DESC, os.id ASC";

/// Column a predicate constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    CustomerId,
    Status,
    /// Calendar day of the entry timestamp, time of day discarded
    EntryDay,
}

impl FilterColumn {
    fn sql(self) -> &'static str {
        match self {
            FilterColumn::CustomerId => "os.customer_id",
            FilterColumn::Status => "os.status",
            FilterColumn::EntryDay => "DATE(os.entry_date)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    AtLeast,
    AtMost,
}

impl FilterOperator {
    fn sql(self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::AtLeast => ">=",
            FilterOperator::AtMost => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

/// One `column operator value` triple; predicates are combined with AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: FilterColumn,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Predicate {
    pub fn new(column: FilterColumn, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            column,
            operator,
            value,
        }
    }

    fn push_to(&self, builder: &mut QueryBuilder<'static, Sqlite>) {
        builder
            .push(self.column.sql())
            .push(" ")
            .push(self.operator.sql())
            .push(" ");

        match &self.value {
            FilterValue::Integer(value) => builder.push_bind(*value),
            FilterValue::Text(value) => builder.push_bind(value.clone()),
        };
    }
}

/// Criteria collected from the report screen. Every field is optional and
/// an absent field places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    /// Raw customer identity; ignored when it is not an integer
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn from_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    #[must_use]
    pub fn until_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Predicates for the criteria that are present and usable
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(raw) = self.customer_id.as_deref() {
            match raw.trim().parse::<i64>() {
                Ok(id) => predicates.push(Predicate::new(
                    FilterColumn::CustomerId,
                    FilterOperator::Eq,
                    FilterValue::Integer(id),
                )),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric customer filter: {:?}", raw);
                }
            }
        }

        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            predicates.push(Predicate::new(
                FilterColumn::Status,
                FilterOperator::Eq,
                FilterValue::Text(status.to_string()),
            ));
        }

        if let Some(start) = self.start_date {
            predicates.push(Predicate::new(
                FilterColumn::EntryDay,
                FilterOperator::AtLeast,
                FilterValue::Text(start.format("%Y-%m-%d").to_string()),
            ));
        }

        if let Some(end) = self.end_date {
            predicates.push(Predicate::new(
                FilterColumn::EntryDay,
                FilterOperator::AtMost,
                FilterValue::Text(end.format("%Y-%m-%d").to_string()),
            ));
        }

        predicates
    }
}

/// Compile predicates into the enriched order statement
pub fn compile(predicates: &[Predicate]) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(ENRICHED_SELECT);

    for (index, predicate) in predicates.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        predicate.push_to(&mut builder);
    }

    builder.push(ENRICHED_ORDER_BY);
    builder
}
