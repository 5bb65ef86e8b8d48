pub mod auth_service;
pub mod credential_service;
pub mod request_service;
pub mod transporter_service;

pub use auth_service::AuthService;
pub use credential_service::{Claims, CredentialService, JwtCredentials};
pub use request_service::RequestService;
pub use transporter_service::TransporterService;
