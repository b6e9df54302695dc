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

/// Patient records router. The same tree mounts under several role prefixes,
/// so the allowed set is supplied by the caller.
pub fn patient_routes(config: Arc<AppConfig>, allowed: &'static [Role]) -> Router {
    Router::new()
        .route("/", get(handlers::list_patients))
        .route("/", post(handlers::create_patient))
        .route("/{id}", get(handlers::get_patient))
        .route("/{id}", put(handlers::update_patient))
        .route("/{id}", delete(handlers::delete_patient))
        .layer(middleware::from_fn(
            move |req: Request<Body>, next| require_roles(allowed, req, next),
        ))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
