use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{Role, User},
};

/// Identity carried inside a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// Issues and verifies identity tokens. The rest of the crate only sees
/// this trait, never the token format.
pub trait CredentialService: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// HS256 JSON web tokens
pub struct JwtCredentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl JwtCredentials {
    pub fn new(secret: &str, validity_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity: Duration::hours(validity_hours),
        }
    }
}

impl CredentialService for JwtCredentials {
    fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {e}")))
    }

    fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Auth("Token expired".into()),
                _ => AppError::Auth("Invalid token".into()),
            })?;

        Ok(data.claims)
    }
}
