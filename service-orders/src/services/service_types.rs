//! Service types service

use crate::database::{Repository, ServiceType};
use crate::error::Result;
use crate::forms::ServiceTypeForm;

/// Service for managing service types
#[derive(Clone)]
pub struct ServiceTypesService {
    repo: Repository,
}

impl ServiceTypesService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn create_service_type(&self, form: &ServiceTypeForm) -> Result<ServiceType> {
        let input = form.validate()?;
        tracing::info!("Creating service type: {}", input.name);

        self.repo
            .create_service_type(&input.name, input.description.as_deref())
            .await
    }

    pub async fn get_service_type(&self, id: i64) -> Result<ServiceType> {
        self.repo.get_service_type(id).await
    }

    pub async fn list_service_types(&self) -> Result<Vec<ServiceType>> {
        self.repo.list_service_types().await
    }

    pub async fn update_service_type(&self, id: i64, form: &ServiceTypeForm) -> Result<ServiceType> {
        let input = form.validate()?;
        tracing::debug!("Updating service type: {}", id);

        self.repo
            .update_service_type(id, &input.name, input.description.as_deref())
            .await
    }

    /// Delete a service type; its orders keep existing without one
    pub async fn delete_service_type(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting service type: {}", id);
        self.repo.delete_service_type(id).await
    }
}
