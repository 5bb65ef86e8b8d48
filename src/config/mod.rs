use std::env;

/// Runtime posture, decides how much error detail leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
	Development,
	Production,
}

impl Environment {
	fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"development" | "dev" => Environment::Development,
			_ => Environment::Production,
		}
	}

	pub fn is_development(self) -> bool {
		self == Environment::Development
	}
}

#[derive(Debug, Clone)]
pub struct Config {
	pub server_host: String,
	pub server_port: u16,
	pub database_url: String,
	pub max_pool_size: u32,
	pub jwt_secret: String,
	pub jwt_expiration_hours: i64,
	pub environment: Environment,
	pub allow_admin_signup: bool,
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		// Load .env file if it exists
		let _ = dotenvy::dotenv();

		Ok(Self {
			server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
			server_port: env::var("SERVER_PORT")
				.unwrap_or_else(|_| "8080".to_string())
				.parse()
				.map_err(|_| ConfigError::InvalidPort)?,
			database_url: env::var("DATABASE_URL")
				.unwrap_or_else(|_| "sqlite://transport.db".to_string()),
			max_pool_size: env::var("MAX_POOL_SIZE")
				.unwrap_or_else(|_| "5".to_string())
				.parse()
				.unwrap_or(5),
			jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?,
			jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
				.unwrap_or_else(|_| "24".to_string())
				.parse()
				.map_err(|_| ConfigError::InvalidExpiration)?,
			environment: Environment::parse(
				&env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
			),
			allow_admin_signup: env::var("ALLOW_ADMIN_SIGNUP")
				.map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
				.unwrap_or(false),
		})
	}

	pub fn server_addr(&self) -> String {
		format!("{}:{}", self.server_host, self.server_port)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid port number")]
	InvalidPort,
	#[error("JWT_SECRET must be set")]
	MissingJwtSecret,
	#[error("JWT_EXPIRATION_HOURS must be a number")]
	InvalidExpiration,
}
