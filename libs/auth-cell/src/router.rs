use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::guard::{auth_middleware, require_roles};

use crate::handlers;
use crate::services::IdentityService;

/// Auth cell state: the process-wide identity owner plus the platform config.
/// Constructed once in the binary and injected; there is no ambient global.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<IdentityService>,
}

pub fn auth_routes(config: Arc<AppConfig>, identity: Arc<IdentityService>) -> Router {
    let state = AuthState { config, identity };

    Router::new()
        .route("/session", get(handlers::session))
        .route("/signin", post(handlers::sign_in))
        .route("/signup", post(handlers::sign_up))
        .route("/verify", post(handlers::verify))
        .route("/signout", post(handlers::sign_out))
        .route("/role", put(handlers::update_role))
        .with_state(state)
}

/// Receptionist account management for the admin console.
pub fn staff_routes(config: Arc<AppConfig>, allowed: &'static [Role]) -> Router {
    Router::new()
        .route("/", get(handlers::list_receptionists))
        .route("/", post(handlers::create_receptionist))
        .route("/{id}", put(handlers::update_receptionist))
        .route("/{id}", delete(handlers::delete_receptionist))
        .layer(middleware::from_fn(
            move |req: Request<Body>, next| require_roles(allowed, req, next),
        ))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
