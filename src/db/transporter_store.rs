use chrono::Utc;

use crate::{
    db::{is_unique_violation, DbPool},
    error::{AppError, Result},
    models::transporter::{
        ContainerFields, TransporterDetails, TransporterDetailsWithRequest, TransporterDraft,
    },
};

/// Store for the transporter_details table
#[derive(Clone)]
pub struct TransporterStore {
    pool: DbPool,
}

impl TransporterStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert details for `request_id`. The UNIQUE constraint on request_id
    /// turns a second insert for the same request into a conflict.
    pub async fn insert(&self, request_id: i64, draft: &TransporterDraft) -> Result<TransporterDetails> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO transporter_details (
                request_id, transporter_name, vehicle_number, vehicle_make,
                model_year, driver_name, driver_contact, license_number,
                license_expiry, base_charge, additional_charges, total_charge,
                container_no, line, seal_no, number_of_containers,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request_id)
        .bind(&draft.transporter_name)
        .bind(&draft.vehicle_number)
        .bind(&draft.vehicle_make)
        .bind(draft.model_year)
        .bind(&draft.driver_name)
        .bind(&draft.driver_contact)
        .bind(&draft.license_number)
        .bind(draft.license_expiry)
        .bind(draft.base_charge.to_string())
        .bind(draft.additional_charges.to_string())
        .bind(draft.total_charge.to_string())
        .bind(&draft.containers.container_no)
        .bind(&draft.containers.line)
        .bind(&draft.containers.seal_no)
        .bind(draft.containers.number_of_containers)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Transporter details already exist for this request".into())
            } else {
                AppError::Database(e)
            }
        })?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(AppError::NotFound("Transporter details"))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<TransporterDetails>> {
        let details =
            sqlx::query_as::<_, TransporterDetails>("SELECT * FROM transporter_details WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(details)
    }

    pub async fn find_by_request_id(&self, request_id: i64) -> Result<Option<TransporterDetails>> {
        let details = sqlx::query_as::<_, TransporterDetails>(
            "SELECT * FROM transporter_details WHERE request_id = ?",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(details)
    }

    /// Overwrite every mutable field. Returns the updated row, if any.
    pub async fn update(&self, id: i64, draft: &TransporterDraft) -> Result<Option<TransporterDetails>> {
        let result = sqlx::query(
            r#"
            UPDATE transporter_details
            SET transporter_name = ?,
                vehicle_number = ?,
                vehicle_make = ?,
                model_year = ?,
                driver_name = ?,
                driver_contact = ?,
                license_number = ?,
                license_expiry = ?,
                base_charge = ?,
                additional_charges = ?,
                total_charge = ?,
                container_no = ?,
                line = ?,
                seal_no = ?,
                number_of_containers = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&draft.transporter_name)
        .bind(&draft.vehicle_number)
        .bind(&draft.vehicle_make)
        .bind(draft.model_year)
        .bind(&draft.driver_name)
        .bind(&draft.driver_contact)
        .bind(&draft.license_number)
        .bind(draft.license_expiry)
        .bind(draft.base_charge.to_string())
        .bind(draft.additional_charges.to_string())
        .bind(draft.total_charge.to_string())
        .bind(&draft.containers.container_no)
        .bind(&draft.containers.line)
        .bind(&draft.containers.seal_no)
        .bind(draft.containers.number_of_containers)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Overwrite only the four container fields
    pub async fn update_containers(
        &self,
        id: i64,
        containers: &ContainerFields,
    ) -> Result<Option<TransporterDetails>> {
        let result = sqlx::query(
            r#"
            UPDATE transporter_details
            SET container_no = ?,
                line = ?,
                seal_no = ?,
                number_of_containers = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&containers.container_no)
        .bind(&containers.line)
        .bind(&containers.seal_no)
        .bind(containers.number_of_containers)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// All details with request status, parties and customer, newest first
    pub async fn list_all_with_request(&self) -> Result<Vec<TransporterDetailsWithRequest>> {
        let details = sqlx::query_as::<_, TransporterDetailsWithRequest>(
            r#"
            SELECT
                td.*,
                tr.status AS request_status,
                tr.consignee,
                tr.consigner,
                u.name AS customer_name,
                u.email AS customer_email
            FROM transporter_details td
            INNER JOIN transport_requests tr ON td.request_id = tr.id
            INNER JOIN users u ON tr.customer_id = u.id
            ORDER BY td.created_at DESC, td.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(details)
    }

    /// Delete by id. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transporter_details WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
