//! Backend entry-point: wires configuration, storage, and the HTTP server.

use std::net::SocketAddr;
use std::time::Duration as StdDuration;

use actix_web::web;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use sweetshop_backend::inbound::http::health::HealthState;
use sweetshop_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use sweetshop_backend::server::{ServerConfig, create_server};

/// Sweet shop inventory backend.
#[derive(Debug, Parser)]
#[command(name = "sweetshop-backend")]
struct Args {
    /// Socket address to bind.
    #[arg(long, env = "SWEETSHOP_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// PostgreSQL connection URL. Without it the server runs on in-memory
    /// stores, which do not survive a restart.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Bearer session lifetime in seconds.
    #[arg(long, env = "SWEETSHOP_SESSION_TTL_SECS", default_value_t = 7200)]
    session_ttl_secs: i64,

    /// Database pool checkout timeout in seconds.
    #[arg(long, env = "SWEETSHOP_DB_TIMEOUT_SECS", default_value_t = 30)]
    db_timeout_secs: u64,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();
    let session_ttl = chrono::Duration::seconds(args.session_ttl_secs);
    let mut config = ServerConfig::new(args.bind, session_ttl);

    if let Some(database_url) = args.database_url {
        run_pending_migrations(database_url.clone()).await?;
        let pool_config = PoolConfig::new(database_url)
            .with_connection_timeout(StdDuration::from_secs(args.db_timeout_secs));
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("DATABASE_URL not set; falling back to in-memory stores");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
