//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::AppConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::report::ReportRenderer;
use crate::services::{CustomersService, OrdersService, ReportsService, ServiceTypesService};
use crate::session::ReportSession;
use crate::storage::UploadsStore;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repo: Repository,
    pub customers: CustomersService,
    pub service_types: ServiceTypesService,
    pub orders: OrdersService,
    pub reports: ReportsService,
}

impl AppState {
    /// Create directories, open the database and wire the services.
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application");
        tracing::info!("Data directory: {:?}", config.data_dir);

        tokio::fs::create_dir_all(&config.data_dir).await?;
        tokio::fs::create_dir_all(config.reports_path()).await?;

        let uploads = UploadsStore::new(config.uploads_path());
        uploads.initialize().await?;

        let pool = create_pool(&config.database_path()).await?;
        let repo = Repository::new(pool);

        let renderer = ReportRenderer::new(uploads.clone(), config.reports_path());

        let state = Self {
            customers: CustomersService::new(repo.clone(), uploads.clone()),
            service_types: ServiceTypesService::new(repo.clone()),
            orders: OrdersService::new(repo.clone(), uploads),
            reports: ReportsService::new(repo.clone(), renderer),
            repo,
            config,
        };

        tracing::info!("Application initialized successfully");

        Ok(state)
    }

    /// Fresh state for a report screen
    pub fn report_session(&self) -> ReportSession {
        ReportSession::new(self.reports.clone())
    }
}
