use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreatePrescriptionRequest, ListPrescriptionsQuery};
use crate::services::PrescriptionService;

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<ListPrescriptionsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescriptions = service
        .list_prescriptions(query, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "prescriptions": prescriptions,
        "total": prescriptions.len()
    })))
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    if request.diagnosis.trim().is_empty() {
        return Err(AppError::ValidationError(
            "A diagnosis is required".to_string(),
        ));
    }

    let service = PrescriptionService::new(&config);

    let prescription = service
        .create_prescription(request, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(prescription)))
}
