use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::time::Duration;

pub mod request_store;
pub mod transporter_store;
pub mod user_store;

pub use request_store::RequestStore;
pub use transporter_store::TransporterStore;
pub use user_store::UserStore;

pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    // Create the database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    // Create connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    // Verify once before anything is served
    sqlx::query("SELECT 1").execute(&pool).await?;

    // Run migrations
    setup_database(&pool).await?;

    tracing::info!("Database ready at {}", database_url);
    Ok(pool)
}

/// Drain the pool on shutdown
pub async fn close_pool(pool: DbPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}

/// Set up the database schema
pub async fn setup_database(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // service_type and service_prices hold JSON text
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transport_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL REFERENCES users(id),
            vehicle_type TEXT NOT NULL,
            vehicle_size TEXT NOT NULL,
            consignee TEXT NOT NULL,
            consigner TEXT NOT NULL,
            containers_20ft INTEGER NOT NULL DEFAULT 0,
            containers_40ft INTEGER NOT NULL DEFAULT 0,
            total_containers INTEGER NOT NULL DEFAULT 0,
            pickup_location TEXT NOT NULL,
            stuffing_location TEXT,
            delivery_location TEXT NOT NULL,
            commodity TEXT NOT NULL,
            cargo_type TEXT NOT NULL,
            cargo_weight TEXT NOT NULL,
            service_type TEXT NOT NULL DEFAULT '[]',
            service_prices TEXT NOT NULL DEFAULT '{}',
            expected_pickup_date TEXT NOT NULL,
            expected_delivery_date TEXT NOT NULL,
            requested_price TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            admin_comment TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transporter_details (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            request_id INTEGER NOT NULL UNIQUE REFERENCES transport_requests(id),
            transporter_name TEXT NOT NULL,
            vehicle_number TEXT NOT NULL,
            vehicle_make TEXT,
            model_year INTEGER,
            driver_name TEXT NOT NULL,
            driver_contact TEXT NOT NULL,
            license_number TEXT NOT NULL,
            license_expiry TEXT NOT NULL,
            base_charge TEXT NOT NULL,
            additional_charges TEXT NOT NULL DEFAULT '0.00',
            total_charge TEXT NOT NULL,
            container_no TEXT,
            line TEXT,
            seal_no TEXT,
            number_of_containers INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transport_requests_customer_id ON transport_requests(customer_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
