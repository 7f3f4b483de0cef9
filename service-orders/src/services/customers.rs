//! Customers service
//!
//! Validates customer forms and keeps the uploads directory in step with
//! cascading deletes.

use crate::database::{Customer, Repository};
use crate::error::Result;
use crate::forms::CustomerForm;
use crate::storage::UploadsStore;

/// Service for managing customers
#[derive(Clone)]
pub struct CustomersService {
    repo: Repository,
    uploads: UploadsStore,
}

impl CustomersService {
    pub fn new(repo: Repository, uploads: UploadsStore) -> Self {
        Self { repo, uploads }
    }

    /// Create a new customer
    pub async fn create_customer(&self, form: &CustomerForm) -> Result<Customer> {
        let input = form.validate()?;
        tracing::info!("Creating customer: {}", input.name);

        let customer = self.repo.create_customer(&input).await?;

        tracing::info!("Customer created successfully: {}", customer.id);
        Ok(customer)
    }

    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        self.repo.get_customer(id).await
    }

    /// List all customers by name
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        self.repo.list_customers().await
    }

    pub async fn update_customer(&self, id: i64, form: &CustomerForm) -> Result<Customer> {
        let input = form.validate()?;
        tracing::debug!("Updating customer: {}", id);

        self.repo.update_customer(id, &input).await
    }

    /// Delete a customer along with its service orders and their photos
    pub async fn delete_customer(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting customer: {}", id);

        let photos = self.repo.delete_customer(id).await?;
        for photo in &photos {
            self.uploads.remove_quietly(photo).await;
        }

        tracing::info!(
            "Customer deleted successfully: {} ({} photos removed)",
            id,
            photos.len()
        );
        Ok(())
    }
}
