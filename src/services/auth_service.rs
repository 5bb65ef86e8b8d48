use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    db::{user_store::NewUser, UserStore},
    error::{AppError, Result},
    models::{
        fields::{optional_text, FieldCheck},
        user::{AuthResponse, LoginRequest, Role, SignupRequest, UserDto},
    },
    services::CredentialService,
};

/// Signup, login and the admin user listing
pub struct AuthService {
    users: UserStore,
    credentials: Arc<dyn CredentialService>,
    allow_admin_signup: bool,
}

impl AuthService {
    pub fn new(
        users: UserStore,
        credentials: Arc<dyn CredentialService>,
        allow_admin_signup: bool,
    ) -> Self {
        Self {
            users,
            credentials,
            allow_admin_signup,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse> {
        let mut check = FieldCheck::new();
        let name = check.text("name", request.name);
        let email = check.text("email", request.email);
        let password = check.value("password", request.password.filter(|p| !p.is_empty()));
        check.finish()?;

        let role = request.role.unwrap_or_default();
        if role == Role::Admin && !self.allow_admin_signup {
            return Err(AppError::Forbidden("Admin accounts cannot be self-registered".into()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists with this email".into()));
        }

        let password_hash = hash_password(password).await?;
        let phone = optional_text(request.phone);
        let user = self
            .users
            .create_user(NewUser {
                name: &name,
                email: &email,
                phone: phone.as_deref(),
                password_hash: &password_hash,
                role,
            })
            .await?;

        tracing::info!("Registered user {} as {}", user.id, user.role);

        let token = self.credentials.issue(&user)?;
        Ok(AuthResponse {
            token,
            user: UserDto::from(user),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let password = request.password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (optional_text(request.email), password) else {
            return Err(AppError::Validation("Please provide email and password".into()));
        };

        let invalid = || AppError::Auth("Invalid credentials".into());

        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !verify_password(password, user.password_hash.clone()).await? {
            tracing::debug!("Rejected login for user {}", user.id);
            return Err(invalid());
        }

        let token = self.credentials.issue(&user)?;
        Ok(AuthResponse {
            token,
            user: UserDto::from(user),
        })
    }

    pub async fn list_users(&self) -> Result<Vec<UserDto>> {
        let users = self.users.get_all_users().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }
}

/// Hash with argon2 off the async workers
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || -> Result<bool> {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}
