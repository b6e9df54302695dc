use std::sync::Arc;

use axum::{body::Body, http::Request, middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::guard::{auth_middleware, require_roles};

use crate::handlers;

pub fn dashboard_routes(config: Arc<AppConfig>, allowed: &'static [Role]) -> Router {
    Router::new()
        .route("/stats", get(handlers::stats))
        .layer(middleware::from_fn(
            move |req: Request<Body>, next| require_roles(allowed, req, next),
        ))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
