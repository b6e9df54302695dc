use std::sync::Arc;

use axum::{body::Body, http::Request, middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::guard::{auth_middleware, require_roles};

use crate::handlers;

/// Patient-facing assistant chat.
pub fn ai_chat_routes(config: Arc<AppConfig>, allowed: &'static [Role]) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .layer(middleware::from_fn(
            move |req: Request<Body>, next| require_roles(allowed, req, next),
        ))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}

/// Doctor-facing decision support: symptom analysis and patient-language
/// explanations.
pub fn ai_checker_routes(config: Arc<AppConfig>, allowed: &'static [Role]) -> Router {
    Router::new()
        .route("/symptom-analysis", post(handlers::analyze_symptoms))
        .route("/explanation", post(handlers::patient_explanation))
        .layer(middleware::from_fn(
            move |req: Request<Body>, next| require_roles(allowed, req, next),
        ))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
