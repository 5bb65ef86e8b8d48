use chrono::Utc;

use crate::{
    db::DbPool,
    error::{AppError, Result},
    models::{
        fields::{ServicePrices, ServiceTypes},
        transport_request::{
            RequestDraft, RequestStatus, TransportRequest, TransportRequestWithCustomer,
        },
    },
};

/// Store for the transport_requests table
#[derive(Clone)]
pub struct RequestStore {
    pool: DbPool,
}

impl RequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a pending request owned by `customer_id` and return the stored row
    pub async fn insert(
        &self,
        customer_id: i64,
        draft: &RequestDraft,
        service_type: &ServiceTypes,
        service_prices: &ServicePrices,
    ) -> Result<TransportRequest> {
        let service_type = serde_json::to_string(service_type).map_err(AppError::Json)?;
        let service_prices = serde_json::to_string(service_prices).map_err(AppError::Json)?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO transport_requests (
                customer_id, vehicle_type, vehicle_size, consignee, consigner,
                containers_20ft, containers_40ft, total_containers,
                pickup_location, stuffing_location, delivery_location,
                commodity, cargo_type, cargo_weight, service_type,
                service_prices, expected_pickup_date, expected_delivery_date,
                requested_price, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer_id)
        .bind(&draft.vehicle_type)
        .bind(&draft.vehicle_size)
        .bind(&draft.consignee)
        .bind(&draft.consigner)
        .bind(draft.containers_20ft)
        .bind(draft.containers_40ft)
        .bind(draft.total_containers)
        .bind(&draft.pickup_location)
        .bind(&draft.stuffing_location)
        .bind(&draft.delivery_location)
        .bind(&draft.commodity)
        .bind(&draft.cargo_type)
        .bind(draft.cargo_weight.to_string())
        .bind(service_type)
        .bind(service_prices)
        .bind(draft.expected_pickup_date)
        .bind(draft.expected_delivery_date)
        .bind(draft.requested_price.to_string())
        .bind(RequestStatus::Pending)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(AppError::NotFound("Transport request"))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<TransportRequest>> {
        let request =
            sqlx::query_as::<_, TransportRequest>("SELECT * FROM transport_requests WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(request)
    }

    /// Overwrite every mutable field of a request that is still pending and
    /// owned by `customer_id`. Returns whether a row was written.
    pub async fn update_fields(
        &self,
        id: i64,
        customer_id: i64,
        draft: &RequestDraft,
        service_type: &ServiceTypes,
        service_prices: &ServicePrices,
    ) -> Result<bool> {
        let service_type = serde_json::to_string(service_type).map_err(AppError::Json)?;
        let service_prices = serde_json::to_string(service_prices).map_err(AppError::Json)?;

        let result = sqlx::query(
            r#"
            UPDATE transport_requests
            SET vehicle_type = ?,
                vehicle_size = ?,
                consignee = ?,
                consigner = ?,
                containers_20ft = ?,
                containers_40ft = ?,
                total_containers = ?,
                pickup_location = ?,
                stuffing_location = ?,
                delivery_location = ?,
                commodity = ?,
                cargo_type = ?,
                cargo_weight = ?,
                service_type = ?,
                service_prices = ?,
                expected_pickup_date = ?,
                expected_delivery_date = ?,
                requested_price = ?,
                updated_at = ?
            WHERE id = ? AND customer_id = ? AND status = ?
            "#,
        )
        .bind(&draft.vehicle_type)
        .bind(&draft.vehicle_size)
        .bind(&draft.consignee)
        .bind(&draft.consigner)
        .bind(draft.containers_20ft)
        .bind(draft.containers_40ft)
        .bind(draft.total_containers)
        .bind(&draft.pickup_location)
        .bind(&draft.stuffing_location)
        .bind(&draft.delivery_location)
        .bind(&draft.commodity)
        .bind(&draft.cargo_type)
        .bind(draft.cargo_weight.to_string())
        .bind(service_type)
        .bind(service_prices)
        .bind(draft.expected_pickup_date)
        .bind(draft.expected_delivery_date)
        .bind(draft.requested_price.to_string())
        .bind(Utc::now())
        .bind(id)
        .bind(customer_id)
        .bind(RequestStatus::Pending)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Requests of one customer, newest first
    pub async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<TransportRequest>> {
        let requests = sqlx::query_as::<_, TransportRequest>(
            r#"
            SELECT * FROM transport_requests
            WHERE customer_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(requests)
    }

    /// All requests with their owner's name and email, newest first
    pub async fn list_all_with_customer(&self) -> Result<Vec<TransportRequestWithCustomer>> {
        let requests = sqlx::query_as::<_, TransportRequestWithCustomer>(
            r#"
            SELECT
                tr.*,
                u.name AS customer_name,
                u.email AS customer_email
            FROM transport_requests tr
            INNER JOIN users u ON tr.customer_id = u.id
            ORDER BY tr.created_at DESC, tr.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(requests)
    }

    /// Move a pending request to `status`. Returns false when no pending
    /// row with that id exists.
    pub async fn decide(&self, id: i64, status: RequestStatus, admin_comment: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transport_requests
            SET status = ?,
                admin_comment = ?,
                updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(status)
        .bind(admin_comment)
        .bind(Utc::now())
        .bind(id)
        .bind(RequestStatus::Pending)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
