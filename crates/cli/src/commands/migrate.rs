//! Database migration command.
//!
//! # Environment Variables
//!
//! - `ADDRESS_API_DATABASE_URL` - `PostgreSQL` connection string
//! - `DATABASE_URL` - Fallback when the above is unset
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! binary at compile time.

use secrecy::SecretString;

use address_api_server::db;

/// Errors from running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the address database migrations.
///
/// # Errors
///
/// Returns an error if no database URL is configured, the connection fails,
/// or a migration fails to apply.
pub async fn run(database_url: Option<String>) -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url
        .or_else(|| std::env::var("ADDRESS_API_DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .map(SecretString::from)
        .ok_or(MigrationError::MissingEnvVar("ADDRESS_API_DATABASE_URL"))?;

    tracing::info!("Connecting to address database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running address migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Address migrations complete!");
    Ok(())
}
