//! Report screen session
//!
//! Holds everything one report screen needs between user actions: the raw
//! criteria, and the temporary report waiting to be saved. A session is
//! created when the screen opens and dropped when the user leaves it;
//! dropping it removes any report that was never saved.

use crate::config::TEMP_REPORT_PREFIX;
use crate::database::OrderFilter;
use crate::error::{AppError, Result};
use crate::forms::parse_display_date;
use crate::report::format::{filename_customer_part, sanitize_filename};
use crate::services::ReportsService;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ALL_CUSTOMERS: &str = "TodosClientes";
const ALL_STATUSES: &str = "TodosStatus";

/// Report criteria as entered on the screen. Blank means "any".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportCriteria {
    pub customer_id: String,
    pub status: String,
    /// `DD/MM/YYYY`
    pub start_date: String,
    /// `DD/MM/YYYY`
    pub end_date: String,
}

impl ReportCriteria {
    /// Validate dates and build the order filter
    pub fn to_filter(&self) -> Result<OrderFilter> {
        let mut filter = OrderFilter::new();

        if !self.customer_id.trim().is_empty() {
            filter = filter.customer(self.customer_id.trim());
        }
        if !self.status.trim().is_empty() {
            filter = filter.status(self.status.trim());
        }
        if let Some(start) = parse_display_date("start_date", &self.start_date)? {
            filter = filter.from_date(start);
        }
        if let Some(end) = parse_display_date("end_date", &self.end_date)? {
            filter = filter.until_date(end);
        }

        Ok(filter)
    }
}

/// A rendered report that has not been saved yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReport {
    pub temp_path: PathBuf,
    pub suggested_name: String,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// Nothing matched; no file was written
    NoMatches,
    Ready(PendingReport),
}

pub struct ReportSession {
    reports: ReportsService,
    criteria: ReportCriteria,
    pending: Option<PendingReport>,
}

impl ReportSession {
    pub fn new(reports: ReportsService) -> Self {
        Self {
            reports,
            criteria: ReportCriteria::default(),
            pending: None,
        }
    }

    pub fn criteria(&self) -> &ReportCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: ReportCriteria) {
        self.criteria = criteria;
    }

    pub fn pending(&self) -> Option<&PendingReport> {
        self.pending.as_ref()
    }

    /// Filter with the current criteria and render the matches to a
    /// temporary file. Replaces any earlier unsaved report.
    pub async fn generate(&mut self) -> Result<GenerateOutcome> {
        let filter = self.criteria.to_filter()?;
        self.discard().await;

        let orders = self.reports.filter(&filter).await;
        if orders.is_empty() {
            tracing::info!("No service orders match the report criteria");
            return Ok(GenerateOutcome::NoMatches);
        }

        let order_count = orders.len();
        let suggested_name = self.suggested_name().await;
        let temp_name = format!(
            "{}{}.pdf",
            TEMP_REPORT_PREFIX,
            Utc::now().timestamp_millis()
        );

        let temp_path = self.reports.render_report(orders, &temp_name).await?;

        let pending = PendingReport {
            temp_path,
            suggested_name,
            order_count,
        };
        tracing::info!(
            "Report with {} orders ready at {:?}",
            order_count,
            pending.temp_path
        );

        self.pending = Some(pending.clone());
        Ok(GenerateOutcome::Ready(pending))
    }

    /// Copy the pending report to `destination` and forget it
    pub async fn save_as(&mut self, destination: &Path) -> Result<PathBuf> {
        let pending = self
            .pending
            .as_ref()
            .ok_or_else(|| AppError::Report("No report has been generated".to_string()))?;

        tokio::fs::copy(&pending.temp_path, destination).await?;
        tracing::info!("Report saved to {:?}", destination);

        self.discard().await;
        Ok(destination.to_path_buf())
    }

    /// Remove the pending report, if any
    pub async fn discard(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Err(e) = tokio::fs::remove_file(&pending.temp_path).await {
                tracing::warn!(
                    "Failed to remove temporary report {:?}: {}",
                    pending.temp_path,
                    e
                );
            }
        }
    }

    /// `RelatorioOS_<customer>_<status>_<timestamp>.pdf`
    async fn suggested_name(&self) -> String {
        let customer_id = self.criteria.customer_id.trim();
        let customer = if customer_id.is_empty() {
            ALL_CUSTOMERS.to_string()
        } else {
            let name = match customer_id.parse::<i64>() {
                Ok(id) => self.reports.customer_name(id).await,
                Err(_) => None,
            };
            name.unwrap_or_else(|| format!("Cliente_{}", customer_id))
        };

        let status = match self.criteria.status.trim() {
            "" => ALL_STATUSES,
            status => status,
        };

        suggested_filename(
            &customer,
            status,
            &Local::now().format("%Y%m%d_%H%M%S").to_string(),
        )
    }
}

impl Drop for ReportSession {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Err(e) = std::fs::remove_file(&pending.temp_path) {
                tracing::warn!(
                    "Failed to remove temporary report {:?}: {}",
                    pending.temp_path,
                    e
                );
            }
        }
    }
}

fn suggested_filename(customer: &str, status: &str, timestamp: &str) -> String {
    format!(
        "RelatorioOS_{}_{}_{}.pdf",
        filename_customer_part(customer),
        sanitize_filename(status),
        timestamp
    )
}
