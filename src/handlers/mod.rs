use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::Config,
    db::{DbPool, RequestStore, TransporterStore, UserStore},
    services::{AuthService, CredentialService, JwtCredentials, RequestService, TransporterService},
};

pub mod admin;
pub mod auth;
pub mod extract;
pub mod transport_request;
pub mod transporter;

pub use extract::{AdminUser, ApiJson, ApiPath, AuthUser};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth: Arc<AuthService>,
    pub requests: Arc<RequestService>,
    pub transporters: Arc<TransporterService>,
    pub credentials: Arc<dyn CredentialService>,
}

impl AppState {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        let credentials: Arc<dyn CredentialService> = Arc::new(JwtCredentials::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));
        Self::with_credentials(pool, credentials, config.allow_admin_signup)
    }

    pub fn with_credentials(
        pool: DbPool,
        credentials: Arc<dyn CredentialService>,
        allow_admin_signup: bool,
    ) -> Self {
        let users = UserStore::new(pool.clone());
        let requests = RequestStore::new(pool.clone());
        let transporters = TransporterStore::new(pool.clone());

        Self {
            auth: Arc::new(AuthService::new(users, credentials.clone(), allow_admin_signup)),
            requests: Arc::new(RequestService::new(requests.clone())),
            transporters: Arc::new(TransporterService::new(transporters, requests)),
            credentials,
            pool,
        }
    }
}

/// Success envelope: `{success: true, message?, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }
}
