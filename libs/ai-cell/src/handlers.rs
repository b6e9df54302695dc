use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    response::{IntoResponse, Response},
    Json,
};
use futures::channel::mpsc;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{ChatRequest, ChatResponse, ExplanationRequest, SymptomAnalysisRequest};
use crate::services::{AnalysisService, ChatService};

/// Chat endpoint. With `stream: true` the reply is relayed as SSE events:
/// `chunk` per content fragment, then one `done` event carrying the full
/// concatenated text, or an `error` event. Without it, a single JSON body.
#[axum::debug_handler]
pub async fn chat(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if !request.stream {
        let service = ChatService::new(&config);
        return match service.complete(&request.message).await {
            Ok(message) => Json(ChatResponse { message }).into_response(),
            Err(e) => AppError::ExternalService(e.to_string()).into_response(),
        };
    }

    let (tx, rx) = mpsc::unbounded::<Result<Event, Infallible>>();

    tokio::spawn(async move {
        let service = ChatService::new(&config);
        let chunk_tx = tx.clone();

        let outcome = service
            .complete_streamed(&request.message, |chunk| {
                let _ = chunk_tx.unbounded_send(Ok(Event::default().event("chunk").data(chunk)));
            })
            .await;

        let last = match outcome {
            Ok(full_message) => Event::default().event("done").data(full_message),
            Err(e) => Event::default().event("error").data(e.to_string()),
        };
        let _ = tx.unbounded_send(Ok(last));
    });

    Sse::new(rx).into_response()
}

#[axum::debug_handler]
pub async fn analyze_symptoms(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SymptomAnalysisRequest>,
) -> Json<serde_json::Value> {
    let service = AnalysisService::new(&config);

    // Unusable AI output degrades to the fixed "unknown" analysis.
    let analysis = service.analyze_symptoms(&request).await;

    Json(serde_json::json!(analysis))
}

#[axum::debug_handler]
pub async fn patient_explanation(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<ExplanationRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = AnalysisService::new(&config);

    let explanation = service
        .patient_explanation(&request.diagnosis, &request.medicines)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(serde_json::json!({ "explanation": explanation })))
}
