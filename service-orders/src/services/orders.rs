//! Service orders service
//!
//! Order lifecycle on top of the repository: number suggestion, photo
//! attachment and photo cleanup when an order stops referencing it.

use crate::database::{EnrichedServiceOrder, Repository, ServiceOrder};
use crate::error::Result;
use crate::forms::ServiceOrderForm;
use crate::storage::UploadsStore;
use chrono::Utc;
use std::path::Path;

/// Service for managing service orders
#[derive(Clone)]
pub struct OrdersService {
    repo: Repository,
    uploads: UploadsStore,
}

impl OrdersService {
    pub fn new(repo: Repository, uploads: UploadsStore) -> Self {
        Self { repo, uploads }
    }

    /// Number to suggest for a new order.
    ///
    /// Never fails: when the lookup does, an `ERR-<timestamp>` placeholder
    /// is returned for the user to replace.
    pub async fn next_order_number(&self) -> String {
        match self.repo.next_order_number().await {
            Ok(number) => number,
            Err(e) => {
                tracing::error!("Failed to compute next order number: {}", e);
                format!("ERR-{}", Utc::now().timestamp())
            }
        }
    }

    /// Copy a picked photo into the uploads directory.
    /// The returned reference goes into the form's `photo_path`.
    pub async fn attach_photo(&self, source: &Path) -> Result<String> {
        tracing::info!("Attaching photo: {:?}", source);
        self.uploads.store_photo(source).await
    }

    /// Create a new service order
    pub async fn create_order(&self, form: &ServiceOrderForm) -> Result<ServiceOrder> {
        let input = form.validate()?;
        tracing::info!("Creating service order number {}", input.order_number);

        let order = self.repo.create_service_order(&input).await?;

        tracing::info!("Service order created successfully: {}", order.id);
        Ok(order)
    }

    pub async fn get_order(&self, id: i64) -> Result<EnrichedServiceOrder> {
        self.repo.get_service_order(id).await
    }

    /// Every order, newest entry first
    pub async fn list_orders(&self) -> Result<Vec<EnrichedServiceOrder>> {
        self.repo.list_service_orders().await
    }

    /// Replace an order. A photo the order no longer references is removed
    /// once the update has been stored.
    pub async fn update_order(&self, id: i64, form: &ServiceOrderForm) -> Result<ServiceOrder> {
        let input = form.validate()?;
        tracing::debug!("Updating service order: {}", id);

        let previous_photo = self.repo.get_service_order(id).await?.order.photo_path;
        let order = self.repo.update_service_order(id, &input).await?;

        if let Some(old) = previous_photo {
            if order.photo_path.as_deref() != Some(old.as_str()) {
                tracing::debug!("Service order {} no longer uses photo {}", id, old);
                self.uploads.remove_quietly(&old).await;
            }
        }

        Ok(order)
    }

    /// Delete an order and its photo
    pub async fn delete_order(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting service order: {}", id);

        if let Some(photo) = self.repo.delete_service_order(id).await? {
            self.uploads.remove_quietly(&photo).await;
        }

        tracing::info!("Service order deleted successfully: {}", id);
        Ok(())
    }
}
