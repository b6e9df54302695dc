use std::sync::Arc;

use axum::{
    body::Body,
    extract::OriginalUri,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;
use shared_models::auth::{Identity, ProfileRecord, Role, Session};

use crate::jwt::validate_token;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const DOCTOR_ONLY: &[Role] = &[Role::Doctor];
pub const RECEPTIONIST_ONLY: &[Role] = &[Role::Receptionist];
pub const PATIENT_ONLY: &[Role] = &[Role::Patient];

/// Outcome of evaluating a protected route. Decisions are terminal render
/// outcomes, re-computed on every request; nothing caches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Identity resolution has not completed yet; suspend the decision.
    Loading,
    /// Nobody is signed in; go to login, remembering where the user was headed.
    RedirectLogin { next: String },
    /// Signed in, but the role is not in the route's allowed set.
    RedirectForbidden,
    /// Render the nested route tree.
    Render,
}

/// Pure guard rule: identity presence and role membership against a route's
/// allowed-role set. `Role::Unknown` is a member of no set.
pub fn route_decision(
    identity: Option<&Identity>,
    initialized: bool,
    allowed: &[Role],
    requested_path: &str,
) -> RouteDecision {
    if !initialized {
        return RouteDecision::Loading;
    }

    match identity {
        None => RouteDecision::RedirectLogin {
            next: requested_path.to_string(),
        },
        Some(identity) if allowed.contains(&identity.role) => RouteDecision::Render,
        Some(_) => RouteDecision::RedirectForbidden,
    }
}

/// Nested routers see the request with the matched prefix stripped; the
/// original-URI extension keeps the path the client actually asked for.
fn attempted_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn login_redirect(next: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": message,
            "redirect": "/login",
            "next": next,
        })),
    )
        .into_response()
}

fn forbidden_redirect() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Not authorized for this area",
            "redirect": "/403",
        })),
    )
        .into_response()
}

/// Middleware that turns a bearer token into a resolved [`Identity`] in the
/// request extensions. The profile row is re-fetched on every request; a
/// failed fetch degrades to session-only resolution rather than failing the
/// request.
pub async fn auth_middleware(
    axum::extract::State(config): axum::extract::State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let requested_path = attempted_path(&request);

    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(message) => return login_redirect(&requested_path, &message),
    };

    let session = match validate_token(&token, &config.insforge_jwt_secret) {
        Ok(session) => session,
        Err(message) => return login_redirect(&requested_path, &message),
    };

    let identity = resolve_identity(&config, &session, &token).await;

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(identity);

    next.run(request).await
}

fn bearer_token(request: &Request<Body>) -> Result<String, String> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| "Missing authorization header".to_string())?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| "Invalid authorization header format".to_string())?;

    if !auth_value.starts_with("Bearer ") {
        return Err("Invalid authorization header format".to_string());
    }

    Ok(auth_value[7..].to_string())
}

async fn resolve_identity(config: &AppConfig, session: &Session, token: &str) -> Identity {
    let client = InsForgeClient::new(config);

    let profile = match client
        .select_one("profiles", &[("id", &session.user_id)], token)
        .await
    {
        Ok(Some(row)) => serde_json::from_value::<ProfileRecord>(row).ok(),
        Ok(None) => None,
        Err(e) => {
            debug!("Profile fetch failed for {}: {}", session.user_id, e);
            None
        }
    };

    Identity::resolve(session, profile.as_ref())
}

/// Role layer for a route tree. Evaluates [`route_decision`] against the
/// identity the auth middleware resolved.
pub async fn require_roles(
    allowed: &'static [Role],
    request: Request<Body>,
    next: Next,
) -> Response {
    let requested_path = attempted_path(&request);
    let identity = request.extensions().get::<Identity>().cloned();

    match route_decision(identity.as_ref(), true, allowed, &requested_path) {
        RouteDecision::Render => next.run(request).await,
        RouteDecision::RedirectLogin { next: path } => login_redirect(&path, "Not signed in"),
        RouteDecision::RedirectForbidden => forbidden_redirect(),
        RouteDecision::Loading => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
