pub mod fields;
pub mod transport_request;
pub mod transporter;
pub mod user;

pub use transport_request::{
    Decision, RequestFields, RequestStatus, StatusChange, TransportRequest,
    TransportRequestWithCustomer,
};
pub use transporter::{
    ContainerFields, TransporterDetails, TransporterDetailsWithRequest, TransporterFields,
};
pub use user::{AuthResponse, LoginRequest, Role, SignupRequest, User, UserDto};
