pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{auth::require_telegram_auth, cors::mini_app_cors, rate_limit};
use crate::services::{
    profile_service::ProfileService, request_service::RequestService,
    storage_service::StorageService, user_service::UserService,
};
use crate::utils::telegram_auth::InitDataVerifier;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub verifier: Arc<InitDataVerifier>,
    pub user_service: UserService,
    pub profile_service: ProfileService,
    pub request_service: RequestService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> error::Result<Self> {
        let verifier = InitDataVerifier::new(&config.telegram_bot_token)?
            .with_max_age(config.init_data_max_age());

        Ok(Self {
            user_service: UserService::new(pool.clone()),
            profile_service: ProfileService::new(pool.clone()),
            request_service: RequestService::new(pool.clone()),
            storage_service: StorageService::new(
                config.uploads_dir.clone(),
                config.public_base_url.clone(),
                config.max_upload_bytes,
            ),
            verifier: Arc::new(verifier),
            pool,
        })
    }
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route("/validate-user", post(routes::auth::validate_user))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let api = Router::new()
        .route("/api/users/sync", post(routes::users::sync_user))
        .route(
            "/api/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/api/requests",
            get(routes::requests::list_requests).post(routes::requests::create_request),
        )
        .route(
            "/api/requests/:id",
            get(routes::requests::get_request)
                .patch(routes::requests::update_request)
                .delete(routes::requests::delete_request),
        )
        .route("/api/uploads", post(routes::uploads::upload_file))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_telegram_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(public_api)
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(mini_app_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
}
