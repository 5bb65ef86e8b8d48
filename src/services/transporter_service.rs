use crate::{
    db::{RequestStore, TransporterStore},
    error::{AppError, Result},
    models::transporter::{
        ContainerFields, TransporterDetails, TransporterDetailsWithRequest, TransporterFields,
    },
};

/// Carrier assignment for transport requests. At most one set of details
/// exists per request.
pub struct TransporterService {
    transporters: TransporterStore,
    requests: RequestStore,
}

impl TransporterService {
    pub fn new(transporters: TransporterStore, requests: RequestStore) -> Self {
        Self {
            transporters,
            requests,
        }
    }

    pub async fn create_transporter_details(
        &self,
        request_id: i64,
        fields: TransporterFields,
    ) -> Result<TransporterDetails> {
        if self.requests.find_by_id(request_id).await?.is_none() {
            return Err(AppError::NotFound("Transport request"));
        }

        let draft = fields.validate()?;

        if self.transporters.find_by_request_id(request_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Transporter details already exist for this request".into(),
            ));
        }

        let details = self.transporters.insert(request_id, &draft).await?;
        tracing::info!(
            "Transporter details {} assigned to request {} (total {})",
            details.id,
            request_id,
            details.total_charge
        );
        Ok(details)
    }

    pub async fn update_transporter_details(
        &self,
        id: i64,
        fields: TransporterFields,
    ) -> Result<TransporterDetails> {
        if self.transporters.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Transporter details"));
        }

        let draft = fields.validate()?;

        let details = self
            .transporters
            .update(id, &draft)
            .await?
            .ok_or(AppError::NotFound("Transporter details"))?;

        tracing::info!("Transporter details {} updated", id);
        Ok(details)
    }

    /// Narrow update of the container fields only; charges stay untouched.
    pub async fn update_container_fields(
        &self,
        id: i64,
        containers: ContainerFields,
    ) -> Result<TransporterDetails> {
        let containers = containers.normalized()?;

        let details = self
            .transporters
            .update_containers(id, &containers)
            .await?
            .ok_or(AppError::NotFound("Transporter details"))?;

        tracing::info!("Container details of transporter {} updated", id);
        Ok(details)
    }

    pub async fn get_by_request_id(&self, request_id: i64) -> Result<TransporterDetails> {
        self.transporters
            .find_by_request_id(request_id)
            .await?
            .ok_or(AppError::NotFound("Transporter details"))
    }

    pub async fn list_all(&self) -> Result<Vec<TransporterDetailsWithRequest>> {
        self.transporters.list_all_with_request().await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.transporters.delete(id).await? {
            return Err(AppError::NotFound("Transporter details"));
        }

        tracing::info!("Transporter details {} deleted", id);
        Ok(())
    }
}
