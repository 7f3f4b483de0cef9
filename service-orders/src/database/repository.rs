//! Repository layer for database operations
//!
//! This module provides CRUD operations for customers, service types and
//! service orders, plus the filtered order query used by reports.
//! Constraint violations on writes surface as [`AppError::Integrity`].

use super::filter::{self, OrderFilter};
use super::models::*;
use crate::error::{AppError, Result};
use sqlx::SqlitePool;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ===== Customers =====

    /// Create a new customer
    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, tax_id, phone, email, street, number, complement,
                                   neighborhood, city, state, postal_code)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.street)
        .bind(&input.number)
        .bind(&input.complement)
        .bind(&input.neighborhood)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, "add customer"))?;

        tracing::debug!("Created customer: {}", customer.id);
        Ok(customer)
    }

    /// Get a customer by ID
    pub async fn get_customer(&self, id: i64) -> Result<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Customer",
                id,
            })
    }

    /// List all customers by name
    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Replace every field of a customer
    pub async fn update_customer(&self, id: i64, input: &CustomerInput) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = ?, tax_id = ?, phone = ?, email = ?, street = ?, number = ?,
                complement = ?, neighborhood = ?, city = ?, state = ?, postal_code = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.street)
        .bind(&input.number)
        .bind(&input.complement)
        .bind(&input.neighborhood)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, "update customer"))?
        .ok_or(AppError::NotFound {
            entity: "Customer",
            id,
        })?;

        tracing::debug!("Updated customer: {}", id);
        Ok(customer)
    }

    /// Delete a customer together with all of its service orders.
    ///
    /// Returns the photo references of the removed orders so their files
    /// can be cleaned up.
    pub async fn delete_customer(&self, id: i64) -> Result<Vec<String>> {
        let mut tx = self.pool.begin().await?;

        let photos: Vec<String> = sqlx::query_scalar(
            "SELECT photo_path FROM service_orders WHERE customer_id = ? AND photo_path IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let rows = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NotFound {
                entity: "Customer",
                id,
            });
        }

        tx.commit().await?;

        tracing::debug!("Deleted customer: {} ({} photos orphaned)", id, photos.len());
        Ok(photos)
    }

    // ===== Service types =====

    /// Create a new service type
    pub async fn create_service_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ServiceType> {
        let service_type = sqlx::query_as::<_, ServiceType>(
            "INSERT INTO service_types (name, description) VALUES (?, ?) RETURNING *",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, "add service type"))?;

        tracing::debug!("Created service type: {}", service_type.id);
        Ok(service_type)
    }

    /// Get a service type by ID
    pub async fn get_service_type(&self, id: i64) -> Result<ServiceType> {
        sqlx::query_as::<_, ServiceType>("SELECT * FROM service_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Service type",
                id,
            })
    }

    /// List all service types by name
    pub async fn list_service_types(&self) -> Result<Vec<ServiceType>> {
        let types = sqlx::query_as::<_, ServiceType>("SELECT * FROM service_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(types)
    }

    /// Rename or re-describe a service type
    pub async fn update_service_type(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<ServiceType> {
        let service_type = sqlx::query_as::<_, ServiceType>(
            "UPDATE service_types SET name = ?, description = ? WHERE id = ? RETURNING *",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, "update service type"))?
        .ok_or(AppError::NotFound {
            entity: "Service type",
            id,
        })?;

        tracing::debug!("Updated service type: {}", id);
        Ok(service_type)
    }

    /// Delete a service type. Orders referencing it keep existing with no type.
    pub async fn delete_service_type(&self, id: i64) -> Result<()> {
        let rows = sqlx::query("DELETE FROM service_types WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NotFound {
                entity: "Service type",
                id,
            });
        }

        tracing::debug!("Deleted service type: {}", id);
        Ok(())
    }

    // ===== Service orders =====

    /// Highest purely numeric order number plus one, or "1" for an empty store
    pub async fn next_order_number(&self) -> Result<String> {
        let max: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(order_number AS INTEGER)) FROM service_orders
            WHERE order_number <> '' AND order_number NOT GLOB '*[^0-9]*'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let next = match max {
            None => 1,
            Some(n) => n.checked_add(1).ok_or_else(|| {
                AppError::Generic(format!("Order number {} has no successor", n))
            })?,
        };

        Ok(next.to_string())
    }

    /// Create a new service order
    pub async fn create_service_order(&self, input: &ServiceOrderInput) -> Result<ServiceOrder> {
        let order = sqlx::query_as::<_, ServiceOrder>(
            r#"
            INSERT INTO service_orders (order_number, customer_id, service_type_id, entry_date,
                                        problem_description, service_address, warranty, status,
                                        photo_path, completion_date, value, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&input.order_number)
        .bind(input.customer_id)
        .bind(input.service_type_id)
        .bind(input.entry_date_text())
        .bind(&input.problem_description)
        .bind(&input.service_address)
        .bind(&input.warranty)
        .bind(&input.status)
        .bind(&input.photo_path)
        .bind(input.completion_date_text())
        .bind(input.value)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, "add service order"))?;

        tracing::debug!("Created service order: {} (number {})", order.id, order.order_number);
        Ok(order)
    }

    /// Get an order with its customer and service type fields
    pub async fn get_service_order(&self, id: i64) -> Result<EnrichedServiceOrder> {
        let sql = format!("{} WHERE os.id = ?", filter::ENRICHED_SELECT);

        sqlx::query_as::<_, EnrichedServiceOrder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Service order",
                id,
            })
    }

    /// List every order, most recent entry first
    pub async fn list_service_orders(&self) -> Result<Vec<EnrichedServiceOrder>> {
        self.filter_service_orders(&OrderFilter::default()).await
    }

    /// Orders matching every criterion present in `criteria`
    pub async fn filter_service_orders(
        &self,
        criteria: &OrderFilter,
    ) -> Result<Vec<EnrichedServiceOrder>> {
        let predicates = criteria.predicates();
        let mut builder = filter::compile(&predicates);

        tracing::debug!(
            "Filtering service orders with {} predicates: {:?}",
            predicates.len(),
            predicates
        );

        let rows = builder.build().fetch_all(&self.pool).await?;
        let orders: Vec<EnrichedServiceOrder> =
            rows.iter().map(EnrichedServiceOrder::decode_lenient).collect();

        tracing::debug!("Filter returned {} service orders", orders.len());
        Ok(orders)
    }

    /// Replace every field of an order
    pub async fn update_service_order(
        &self,
        id: i64,
        input: &ServiceOrderInput,
    ) -> Result<ServiceOrder> {
        let order = sqlx::query_as::<_, ServiceOrder>(
            r#"
            UPDATE service_orders
            SET order_number = ?, customer_id = ?, service_type_id = ?, entry_date = ?,
                problem_description = ?, service_address = ?, warranty = ?, status = ?,
                photo_path = ?, completion_date = ?, value = ?, notes = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&input.order_number)
        .bind(input.customer_id)
        .bind(input.service_type_id)
        .bind(input.entry_date_text())
        .bind(&input.problem_description)
        .bind(&input.service_address)
        .bind(&input.warranty)
        .bind(&input.status)
        .bind(&input.photo_path)
        .bind(input.completion_date_text())
        .bind(input.value)
        .bind(&input.notes)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_store(e, "update service order"))?
        .ok_or(AppError::NotFound {
            entity: "Service order",
            id,
        })?;

        tracing::debug!("Updated service order: {}", id);
        Ok(order)
    }

    /// Delete an order, returning its photo reference if it had one
    pub async fn delete_service_order(&self, id: i64) -> Result<Option<String>> {
        let photo: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM service_orders WHERE id = ? RETURNING photo_path")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let photo = photo.ok_or(AppError::NotFound {
            entity: "Service order",
            id,
        })?;

        tracing::debug!("Deleted service order: {}", id);
        Ok(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::initialize_database;
    use chrono::{NaiveDate, NaiveDateTime};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_repo() -> Repository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        Repository::new(pool)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn customer(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_customer() {
        let repo = create_test_repo().await;

        let mut input = customer("Maria Souza");
        input.tax_id = Some("123.456.789-00".to_string());
        input.city = Some("Recife".to_string());

        let created = repo.create_customer(&input).await.unwrap();
        let fetched = repo.get_customer(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.city.as_deref(), Some("Recife"));
    }

    #[tokio::test]
    async fn test_duplicate_tax_id_is_integrity_error() {
        let repo = create_test_repo().await;

        let mut input = customer("First");
        input.tax_id = Some("111".to_string());
        repo.create_customer(&input).await.unwrap();

        input.name = "Second".to_string();
        let err = repo.create_customer(&input).await.unwrap_err();

        assert!(err.is_integrity());
        assert_eq!(repo.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_customers_without_tax_id_do_not_collide() {
        let repo = create_test_repo().await;

        repo.create_customer(&customer("A")).await.unwrap();
        repo.create_customer(&customer("B")).await.unwrap();

        let names: Vec<String> = repo
            .list_customers()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let repo = create_test_repo().await;

        let err = repo.update_customer(99, &customer("Ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { id: 99, .. }));
    }

    #[tokio::test]
    async fn test_delete_customer_cascades_to_orders() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Cascade")).await.unwrap();

        let mut input = ServiceOrderInput::new("1", c.id, at(2024, 1, 1, 8, 0));
        input.photo_path = Some("os_foto_abc.png".to_string());
        repo.create_service_order(&input).await.unwrap();

        let photos = repo.delete_customer(c.id).await.unwrap();

        assert_eq!(photos, vec!["os_foto_abc.png".to_string()]);
        assert!(repo.list_service_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_service_type_unlinks_orders() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Unlink")).await.unwrap();
        let t = repo.create_service_type("Instalação", None).await.unwrap();

        let mut input = ServiceOrderInput::new("1", c.id, at(2024, 1, 1, 8, 0));
        input.service_type_id = Some(t.id);
        let order = repo.create_service_order(&input).await.unwrap();

        repo.delete_service_type(t.id).await.unwrap();

        let fetched = repo.get_service_order(order.id).await.unwrap();
        assert_eq!(fetched.order.service_type_id, None);
        assert_eq!(fetched.service_type_name, None);
    }

    #[tokio::test]
    async fn test_duplicate_service_type_name() {
        let repo = create_test_repo().await;

        repo.create_service_type("Manutenção", Some("Preventiva"))
            .await
            .unwrap();
        let err = repo.create_service_type("Manutenção", None).await.unwrap_err();

        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn test_next_order_number() {
        let repo = create_test_repo().await;
        assert_eq!(repo.next_order_number().await.unwrap(), "1");

        let c = repo.create_customer(&customer("Numbers")).await.unwrap();
        for number in ["9", "10", "A-200", "12b"] {
            repo.create_service_order(&ServiceOrderInput::new(number, c.id, at(2024, 1, 1, 8, 0)))
                .await
                .unwrap();
        }

        assert_eq!(repo.next_order_number().await.unwrap(), "11");
    }

    #[tokio::test]
    async fn test_next_order_number_at_integer_limit() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Limit")).await.unwrap();
        repo.create_service_order(&ServiceOrderInput::new(
            "99999999999999999999",
            c.id,
            at(2024, 1, 1, 8, 0),
        ))
        .await
        .unwrap();

        assert!(repo.next_order_number().await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_order_number_keeps_first() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Dup")).await.unwrap();

        let mut first = ServiceOrderInput::new("100", c.id, at(2024, 1, 1, 8, 0));
        first.notes = Some("first".to_string());
        repo.create_service_order(&first).await.unwrap();

        let mut second = first.clone();
        second.notes = Some("second".to_string());
        let err = repo.create_service_order(&second).await.unwrap_err();

        assert!(err.is_integrity());
        let orders = repo.list_service_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order.notes.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_order_requires_existing_customer() {
        let repo = create_test_repo().await;

        let err = repo
            .create_service_order(&ServiceOrderInput::new("1", 404, at(2024, 1, 1, 8, 0)))
            .await
            .unwrap_err();

        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn test_update_and_delete_service_order() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Lifecycle")).await.unwrap();

        let mut input = ServiceOrderInput::new("5", c.id, at(2024, 2, 2, 9, 30));
        input.photo_path = Some("os_foto_1.jpg".to_string());
        let order = repo.create_service_order(&input).await.unwrap();

        input.status = OrderStatus::Completed.as_str().to_string();
        input.value = Some(250.0);
        input.completion_date = NaiveDate::from_ymd_opt(2024, 2, 5);
        let updated = repo.update_service_order(order.id, &input).await.unwrap();

        assert_eq!(updated.status.as_deref(), Some("Concluída"));
        assert_eq!(updated.value, StoredValue::Amount(250.0));
        assert_eq!(updated.completion_date.as_deref(), Some("2024-02-05"));
        assert_eq!(updated.entry_date, "2024-02-02 09:30:00");

        let photo = repo.delete_service_order(order.id).await.unwrap();
        assert_eq!(photo.as_deref(), Some("os_foto_1.jpg"));

        assert!(repo.delete_service_order(order.id).await.is_err());
    }

    #[tokio::test]
    async fn test_filter_by_status_and_customer() {
        let repo = create_test_repo().await;
        let a = repo.create_customer(&customer("A")).await.unwrap();
        let b = repo.create_customer(&customer("B")).await.unwrap();

        let mut open = ServiceOrderInput::new("1", a.id, at(2024, 1, 1, 8, 0));
        open.status = "Aberta".to_string();
        let mut done = ServiceOrderInput::new("2", a.id, at(2024, 1, 2, 8, 0));
        done.status = "Concluída".to_string();
        let other = ServiceOrderInput::new("3", b.id, at(2024, 1, 3, 8, 0));

        for input in [&open, &done, &other] {
            repo.create_service_order(input).await.unwrap();
        }

        let by_customer = repo
            .filter_service_orders(&OrderFilter::new().customer(a.id.to_string()))
            .await
            .unwrap();
        let numbers: Vec<&str> = by_customer.iter().map(|o| o.order.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "1"]);

        let open_for_a = repo
            .filter_service_orders(
                &OrderFilter::new()
                    .customer(a.id.to_string())
                    .status("Aberta"),
            )
            .await
            .unwrap();
        assert_eq!(open_for_a.len(), 1);
        assert_eq!(open_for_a[0].order.order_number, "1");
        assert_eq!(open_for_a[0].customer.name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_non_numeric_value_is_kept_as_unparseable() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Raw")).await.unwrap();
        let order = repo
            .create_service_order(&ServiceOrderInput::new("1", c.id, at(2024, 1, 1, 8, 0)))
            .await
            .unwrap();

        sqlx::query("UPDATE service_orders SET value = 'a combinar' WHERE id = ?")
            .bind(order.id)
            .execute(repo.pool())
            .await
            .unwrap();

        let fetched = repo.get_service_order(order.id).await.unwrap();
        assert_eq!(
            fetched.order.value,
            StoredValue::Unparseable("a combinar".to_string())
        );
    }

    #[tokio::test]
    async fn test_undecodable_row_does_not_hide_neighbours() {
        let repo = create_test_repo().await;
        let c = repo.create_customer(&customer("Blob")).await.unwrap();
        for (number, day) in [("1", 3), ("2", 2), ("3", 1)] {
            repo.create_service_order(&ServiceOrderInput::new(number, c.id, at(2024, 1, day, 8, 0)))
                .await
                .unwrap();
        }

        sqlx::query("UPDATE service_orders SET notes = X'DEADBEEF' WHERE order_number = '2'")
            .execute(repo.pool())
            .await
            .unwrap();

        let orders = repo.filter_service_orders(&OrderFilter::default()).await.unwrap();

        assert_eq!(orders.len(), 3);
        assert!(orders[0].is_readable());
        assert_eq!(orders[0].order.order_number, "1");
        assert!(!orders[1].is_readable());
        assert_eq!(orders[1].order.id, 2);
        assert!(orders[2].is_readable());
        assert_eq!(orders[2].order.order_number, "3");
    }
}
