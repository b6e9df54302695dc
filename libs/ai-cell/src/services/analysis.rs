use anyhow::Result;
use tracing::warn;

use shared_config::AppConfig;

use crate::models::{SymptomAnalysis, SymptomAnalysisRequest};
use crate::services::chat::ChatService;

/// Clinical decision support on top of the chat forwarder: a rigid
/// JSON-only instruction, then a scan of the reply for the first `{...}`
/// span. Anything that fails along the way degrades to the fixed fallback
/// rather than an error; the caller gets an answer either way.
pub struct AnalysisService {
    chat: ChatService,
}

impl AnalysisService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            chat: ChatService::new(config),
        }
    }

    fn analysis_prompt(request: &SymptomAnalysisRequest) -> String {
        format!(
            "You are a clinical decision support assistant. A doctor is consulting you. \
             Patient: Age {}, Gender {}. Symptoms: {}. Relevant History: {}. \
             Respond ONLY in JSON format with no additional text: \
             {{\"conditions\":[{{\"name\":\"...\",\"probability\":\"...\"}}],\
             \"risk_level\":\"low|medium|high|critical\",\
             \"suggested_tests\":[\"...\"],\"notes\":\"...\"}}",
            request.age,
            request.gender,
            request.symptoms,
            request.history.as_deref().unwrap_or("None"),
        )
    }

    pub async fn analyze_symptoms(&self, request: &SymptomAnalysisRequest) -> SymptomAnalysis {
        let response = match self.chat.complete(&Self::analysis_prompt(request)).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Symptom analysis call failed: {}", e);
                return SymptomAnalysis::fallback();
            }
        };

        parse_analysis(&response)
    }

    pub async fn patient_explanation(&self, diagnosis: &str, medicines: &str) -> Result<String> {
        let prompt = format!(
            "You are a friendly health communicator. Explain the following medical \
             diagnosis to a patient in simple, non-technical language (max 3 sentences). \
             Diagnosis: {}. Medicines: {}. Reassure the patient and tell them what to do next.",
            diagnosis, medicines,
        );

        self.chat.complete(&prompt).await
    }
}

/// First `{` to last `}`, the same greedy span the original response scan
/// matched.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_analysis(response: &str) -> SymptomAnalysis {
    extract_json(response)
        .and_then(|span| serde_json::from_str(span).ok())
        .unwrap_or_else(SymptomAnalysis::fallback)
}
