//! PostgreSQL persistence adapters built on Diesel.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

mod diesel_session_store;
mod diesel_stock_ledger;
mod diesel_sweet_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_session_store::DieselSessionStore;
pub use diesel_stock_ledger::DieselStockLedger;
pub use diesel_sweet_repository::DieselSweetRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Embedded SQL migrations, applied at startup when a database is
/// configured.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply pending migrations on a blocking thread.
///
/// # Errors
/// Returns [`std::io::Error`] when the connection cannot be established or
/// a migration fails; the server must not start against a stale schema.
pub async fn run_pending_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;

        let mut conn = diesel::PgConnection::establish(&database_url)
            .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
        tracing::info!(count = applied.len(), "migrations applied");
        Ok(())
    })
    .await
    .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
}
