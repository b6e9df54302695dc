use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::models::{
    CreateReceptionistRequest, SessionResponse, SignInRequest, SignInResponse, SignUpRequest,
    SignUpResponse, UpdateReceptionistRequest, UpdateRoleRequest, VerifyRequest, VerifyResponse,
};
use crate::router::AuthState;
use crate::services::{RegistrationService, StaffService};

#[axum::debug_handler]
pub async fn session(
    State(state): State<AuthState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Json<SessionResponse> {
    let identity = match auth {
        Some(TypedHeader(auth)) => state.identity.restore(auth.token()).await,
        None => None,
    };

    Json(SessionResponse { identity })
}

#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AuthState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    debug!("Sign-in attempt for {}", request.email);

    let (access_token, identity) = state
        .identity
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(SignInResponse {
        access_token,
        identity,
    }))
}

#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AuthState>,
    Json(request): Json<SignUpRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    let service = RegistrationService::new(&state.config);
    let outcome = service.sign_up(request).await?;

    Ok(Json(SignUpResponse {
        success: true,
        require_verification: outcome.require_verification,
    }))
}

#[axum::debug_handler]
pub async fn verify(
    State(state): State<AuthState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let service = RegistrationService::new(&state.config);
    let outcome = service.verify(request).await?;

    state.identity.publish(outcome.identity.clone()).await;

    Ok(Json(VerifyResponse {
        access_token: outcome.access_token,
        identity: outcome.identity,
    }))
}

#[axum::debug_handler]
pub async fn sign_out(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.identity.sign_out(auth.token()).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn update_role(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let identity = state
        .identity
        .update_role(auth.token(), request.role)
        .await?;

    Ok(Json(serde_json::json!({ "identity": identity })))
}

// Admin console staff management.

#[axum::debug_handler]
pub async fn list_receptionists(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    let receptionists = service
        .list_receptionists(auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "receptionists": receptionists,
        "total": receptionists.len()
    })))
}

/// Receptionist accounts go through the same registration saga as self-service
/// sign-up, just with the role fixed by the admin console.
#[axum::debug_handler]
pub async fn create_receptionist(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateReceptionistRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    let service = RegistrationService::new(&config);

    let outcome = service
        .sign_up(SignUpRequest {
            email: request.email,
            password: request.password,
            name: request.name,
            role: Role::Receptionist,
        })
        .await?;

    Ok(Json(SignUpResponse {
        success: true,
        require_verification: outcome.require_verification,
    }))
}

#[axum::debug_handler]
pub async fn update_receptionist(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(profile_id): Path<String>,
    Json(request): Json<UpdateReceptionistRequest>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    let receptionist = service
        .update_receptionist(&profile_id, request, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(receptionist)))
}

#[axum::debug_handler]
pub async fn delete_receptionist(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(profile_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = StaffService::new(&config);

    service
        .delete_receptionist(&profile_id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "success": true })))
}
