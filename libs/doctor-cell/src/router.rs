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

pub fn doctor_routes(config: Arc<AppConfig>, allowed: &'static [Role]) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/", post(handlers::create_doctor))
        .route("/{id}", get(handlers::get_doctor))
        .route("/{id}", put(handlers::update_doctor))
        .route("/{id}", delete(handlers::delete_doctor))
        .layer(middleware::from_fn(
            move |req: Request<Body>, next| require_roles(allowed, req, next),
        ))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
