//! Transport request lifecycle.
//!
//! A request is created `Pending` by its owner, may be edited by that owner
//! while it stays `Pending`, and is decided exactly once by an admin
//! (`Approved` or `Rejected`, both terminal). Role gates live at the HTTP
//! boundary; ownership and state rules live here.
//!
//! Concurrent edits of the same pending request are last-writer-wins; there
//! is no version column.

use crate::{
    db::RequestStore,
    error::{AppError, Result},
    models::transport_request::{
        Decision, RequestFields, RequestStatus, TransportRequest, TransportRequestWithCustomer,
    },
};

pub struct RequestService {
    store: RequestStore,
}

impl RequestService {
    pub fn new(store: RequestStore) -> Self {
        Self { store }
    }

    /// Create a request owned by `caller_id`. The status is always Pending,
    /// whatever the payload says.
    pub async fn create_request(&self, caller_id: i64, fields: RequestFields) -> Result<TransportRequest> {
        if let Some(status) = fields.status.as_deref().filter(|s| *s != "Pending") {
            tracing::debug!("Ignoring client supplied status {:?} on create", status);
        }

        let (draft, services) = fields.validate()?;
        let (service_type, service_prices) = services.resolve_for_create();

        let request = self
            .store
            .insert(caller_id, &draft, &service_type, &service_prices)
            .await?;

        tracing::info!("Transport request {} created by user {}", request.id, caller_id);
        Ok(request)
    }

    /// Full overwrite of the mutable fields by the owning customer.
    pub async fn update_request(
        &self,
        request_id: i64,
        caller_id: i64,
        fields: RequestFields,
    ) -> Result<TransportRequest> {
        let current = self
            .store
            .find_by_id(request_id)
            .await?
            .ok_or(AppError::NotFound("Transport request"))?;

        if current.customer_id != caller_id {
            tracing::warn!(
                "User {} tried to update transport request {} owned by {}",
                caller_id,
                request_id,
                current.customer_id
            );
            return Err(AppError::Forbidden(
                "You can only update your own transport requests".into(),
            ));
        }
        if current.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Transport request is already {:?}",
                current.status
            )));
        }

        let (draft, services) = fields.validate()?;
        let (service_type, service_prices) = services.resolve_for_update(&current);

        let written = self
            .store
            .update_fields(request_id, caller_id, &draft, &service_type, &service_prices)
            .await?;
        if !written {
            // decided between the read above and the write
            return Err(AppError::Conflict(
                "Transport request is no longer editable".into(),
            ));
        }

        tracing::info!("Transport request {} updated by user {}", request_id, caller_id);
        self.store
            .find_by_id(request_id)
            .await?
            .ok_or(AppError::NotFound("Transport request"))
    }

    pub async fn list_own_requests(&self, caller_id: i64) -> Result<Vec<TransportRequest>> {
        self.store.list_by_customer(caller_id).await
    }

    pub async fn list_all_requests(&self) -> Result<Vec<TransportRequestWithCustomer>> {
        self.store.list_all_with_customer().await
    }

    /// Admin decision. Validation happens before any storage access.
    pub async fn transition_status(
        &self,
        request_id: i64,
        new_status: &str,
        admin_comment: Option<&str>,
    ) -> Result<TransportRequest> {
        let decision: Decision = new_status.parse()?;
        let comment = admin_comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AppError::MissingComment)?;

        let status = RequestStatus::from(decision);
        let decided = self.store.decide(request_id, status, comment).await?;

        let request = self
            .store
            .find_by_id(request_id)
            .await?
            .ok_or(AppError::NotFound("Transport request"))?;

        if !decided {
            return Err(AppError::Conflict(format!(
                "Transport request is already {:?}",
                request.status
            )));
        }

        tracing::info!("Transport request {} marked {:?}", request_id, status);
        Ok(request)
    }
}
