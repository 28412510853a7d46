//! # skylog_api
//!
//! HTTP API library for Skylog.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use skylog_core::auth::authenticator::Authenticator;
use skylog_core::auth::jwt::{TokenIssuer, token_services};
use skylog_core::auth::verification::{CodeDelivery, CodeStore, InMemoryCodeStore, LogCodeDelivery};
use skylog_core::store::Stores;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, ConfigError};
use crate::handlers::{auth, flights, health, journals, memos, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backends.
    pub stores: Stores,
    /// API configuration.
    pub config: ApiConfig,
    /// Signs tokens with the primary secret.
    pub issuer: Arc<TokenIssuer>,
    /// Verifies bearer headers against the primary and previous secrets.
    pub authenticator: Arc<Authenticator>,
    /// Pending email verification codes.
    pub codes: Arc<dyn CodeStore>,
    /// Sends verification codes to users.
    pub delivery: Arc<dyn CodeDelivery>,
}

impl AppState {
    /// Build state from a validated config. Signing keys are derived here,
    /// so a bad secret fails before anything is served.
    pub fn new(config: ApiConfig, stores: Stores) -> Result<Self, ConfigError> {
        config.validate()?;
        let (issuer, verifier) = token_services(
            &config.jwt_secret,
            &config.jwt_previous_secrets,
            config.token_ttl(),
        )
        .map_err(|e| ConfigError::Invalid {
            var: "JWT_SECRET",
            reason: e.to_string(),
        })?;
        Ok(Self {
            stores,
            config,
            issuer: Arc::new(issuer),
            authenticator: Arc::new(Authenticator::new(verifier)),
            codes: Arc::new(InMemoryCodeStore::new()),
            delivery: Arc::new(LogCodeDelivery),
        })
    }

    /// Replace the verification code store.
    pub fn with_code_store(mut self, codes: Arc<dyn CodeStore>) -> Self {
        self.codes = codes;
        self
    }

    /// Replace the verification code delivery.
    pub fn with_code_delivery(mut self, delivery: Arc<dyn CodeDelivery>) -> Self {
        self.delivery = delivery;
        self
    }
}

/// Run embedded database migrations.
///
/// Delegates to `skylog_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    skylog_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_SEND_CODE, post(auth::send_code_handler))
        .route(routes::POST_AUTH_VERIFY_CODE, post(auth::verify_code_handler))
        .route(
            routes::POST_AUTH_RESET_PASSWORD,
            post(auth::reset_password_handler),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .route(routes::PATCH_AUTH_PROFILE, patch(auth::update_profile_handler))
        .route(
            routes::JOURNALS,
            get(journals::list_journals_handler).post(journals::create_journal_handler),
        )
        .route(routes::GET_JOURNALS_MINE, get(journals::list_my_journals_handler))
        .route(
            routes::JOURNALS_ID,
            get(journals::get_journal_handler)
                .put(journals::update_journal_handler)
                .delete(journals::delete_journal_handler),
        )
        .route(
            routes::POST_JOURNALS_ID_COMMENTS,
            post(journals::add_comment_handler),
        )
        .route(
            routes::DELETE_JOURNALS_ID_COMMENTS_ID,
            delete(journals::delete_comment_handler),
        )
        .route(routes::POST_JOURNALS_ID_LIKE, post(journals::toggle_like_handler))
        .route(
            routes::FLIGHTS,
            get(flights::list_flights_handler).post(flights::create_flight_handler),
        )
        .route(
            routes::FLIGHTS_ID,
            get(flights::get_flight_handler)
                .put(flights::update_flight_handler)
                .delete(flights::delete_flight_handler),
        )
        .route(
            routes::PATCH_FLIGHTS_ID_STATUS,
            patch(flights::update_flight_status_handler),
        )
        .route(
            routes::MEMOS,
            get(memos::list_memos_handler).post(memos::create_memo_handler),
        )
        .route(
            routes::MEMOS_ID,
            put(memos::update_memo_handler).delete(memos::delete_memo_handler),
        )
        .route(routes::GET_USER_STATS, get(users::user_stats_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
