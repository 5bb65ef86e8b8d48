pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod test;

pub use config::Config;
pub use handlers::AppState;
pub use routes::build_router;
