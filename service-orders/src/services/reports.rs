//! Reports service
//!
//! The two operations a report screen needs: filtering orders and rendering
//! them. Rendering is blocking work and runs off the async runtime.

use crate::database::{EnrichedServiceOrder, OrderFilter, Repository};
use crate::error::{AppError, Result};
use crate::report::ReportRenderer;
use std::path::PathBuf;

/// Service for filtering service orders and producing PDF reports
#[derive(Clone)]
pub struct ReportsService {
    repo: Repository,
    renderer: ReportRenderer,
}

impl ReportsService {
    pub fn new(repo: Repository, renderer: ReportRenderer) -> Self {
        Self { repo, renderer }
    }

    pub fn renderer(&self) -> &ReportRenderer {
        &self.renderer
    }

    /// Orders matching `criteria`, newest entry first.
    ///
    /// A failed query is logged and reported as no matches. Use
    /// [`ReportsService::try_filter`] to tell the two apart.
    pub async fn filter(&self, criteria: &OrderFilter) -> Vec<EnrichedServiceOrder> {
        match self.try_filter(criteria).await {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!("Service order filter failed, returning no orders: {}", e);
                Vec::new()
            }
        }
    }

    /// Name of a customer for display, `None` when it cannot be found
    pub async fn customer_name(&self, id: i64) -> Option<String> {
        match self.repo.get_customer(id).await {
            Ok(customer) => Some(customer.name),
            Err(e) => {
                tracing::warn!("Could not look up customer {}: {}", id, e);
                None
            }
        }
    }

    pub async fn try_filter(&self, criteria: &OrderFilter) -> Result<Vec<EnrichedServiceOrder>> {
        self.repo.filter_service_orders(criteria).await
    }

    /// Render `records` as `<reports_dir>/<filename>`
    pub async fn render_report(
        &self,
        records: Vec<EnrichedServiceOrder>,
        filename: &str,
    ) -> Result<PathBuf> {
        let renderer = self.renderer.clone();
        let filename = filename.to_string();

        tokio::task::spawn_blocking(move || renderer.render_report(&records, &filename))
            .await
            .map_err(|e| AppError::Report(format!("Report rendering task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database, CustomerInput, ServiceOrderInput};
    use crate::storage::UploadsStore;
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    async fn create_test_service() -> (ReportsService, Repository, TempDir) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        initialize_database(&pool).await.unwrap();

        let temp = TempDir::new().unwrap();
        let renderer = ReportRenderer::new(
            UploadsStore::new(temp.path().join("uploads")),
            temp.path().join("reports"),
        );
        let repo = Repository::new(pool);

        (ReportsService::new(repo.clone(), renderer), repo, temp)
    }

    #[tokio::test]
    async fn test_filter_fails_open() {
        let (service, repo, _temp) = create_test_service().await;
        let customer = repo
            .create_customer(&CustomerInput {
                name: "Ana".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let entry = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        repo.create_service_order(&ServiceOrderInput::new("1", customer.id, entry))
            .await
            .unwrap();

        assert_eq!(service.filter(&OrderFilter::default()).await.len(), 1);

        repo.pool().close().await;

        assert!(service.filter(&OrderFilter::default()).await.is_empty());
        assert!(service.try_filter(&OrderFilter::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_render_report_off_runtime() {
        let (service, _repo, temp) = create_test_service().await;

        let path = service.render_report(Vec::new(), "vazio.pdf").await.unwrap();

        assert_eq!(path, temp.path().join("reports").join("vazio.pdf"));
        assert!(path.exists());
    }
}
