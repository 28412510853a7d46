//! Skylog API server binary.
//!
//! Serves the REST API on `--bind-addr`. With `DATABASE_URL` set, records
//! live in PostgreSQL and migrations run at startup; without it, everything
//! is kept in memory for the life of the process.

use std::sync::Arc;

use clap::Parser;
use skylog_api::config::{ApiConfig, DEFAULT_BIND_ADDR, parse_secret_list};
use skylog_api::{AppState, router};
use skylog_core::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
use skylog_core::auth::password::BCRYPT_COST;
use skylog_core::auth::verification::{DEFAULT_CODE_TTL_SECS, InMemoryCodeStore};
use skylog_core::store::Stores;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "skylog_api_server", about = "Skylog API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    bind_addr: String,

    /// PostgreSQL connection URL. Omit to keep data in memory.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Secret used to sign tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Comma-separated retired secrets still accepted for verification.
    #[arg(long, env = "JWT_PREVIOUS_SECRETS", hide_env_values = true)]
    jwt_previous_secrets: Option<String>,

    /// Token lifetime in seconds.
    #[arg(long, env = "SKYLOG_TOKEN_TTL_SECS", default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    token_ttl_secs: i64,

    /// Verification code lifetime in seconds.
    #[arg(long, env = "SKYLOG_CODE_TTL_SECS", default_value_t = DEFAULT_CODE_TTL_SECS)]
    code_ttl_secs: i64,

    /// bcrypt cost for new password hashes.
    #[arg(long, env = "SKYLOG_BCRYPT_COST", default_value_t = BCRYPT_COST)]
    bcrypt_cost: u32,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "SKYLOG_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,
}

impl Args {
    fn into_config(self) -> ApiConfig {
        let mut config = ApiConfig::new(self.jwt_secret.unwrap_or_default());
        config.bind_addr = self.bind_addr;
        config.database_url = self.database_url.filter(|u| !u.trim().is_empty());
        config.jwt_previous_secrets = self
            .jwt_previous_secrets
            .as_deref()
            .map(parse_secret_list)
            .unwrap_or_default();
        config.token_ttl_secs = self.token_ttl_secs;
        config.code_ttl_secs = self.code_ttl_secs;
        config.bcrypt_cost = self.bcrypt_cost;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
                tracing_subscriber::EnvFilter::try_new("info,skylog_api=debug,skylog_core=debug")
            })?,
        )
        .init();

    let args = Args::parse();
    let max_connections = args.max_connections;
    let config = args.into_config();
    config.validate()?;

    info!(?config, "starting skylog_api_server");

    let stores = match config.database_url.as_deref() {
        Some(url) => {
            info!(max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            skylog_api::migrate(&pool).await?;
            Stores::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory store");
            Stores::in_memory()
        }
    };

    let codes = Arc::new(InMemoryCodeStore::new());
    let cleanup = codes.spawn_cleanup_task();

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, stores)?.with_code_store(codes);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("shutdown signal received");
                    shutdown.cancel();
                }
                Err(e) => warn!(error = %e, "cannot listen for shutdown signal"),
            }
        }
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    cleanup.abort();
    result?;

    Ok(())
}
