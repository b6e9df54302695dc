use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymptomAnalysisRequest {
    pub symptoms: String,
    pub age: String,
    pub gender: String,
    pub history: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub probability: String,
}

/// Structured output of the clinical decision support prompt. When the model
/// returns anything unparseable the fixed fallback takes its place; see
/// [`SymptomAnalysis::fallback`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub conditions: Vec<Condition>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub suggested_tests: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl SymptomAnalysis {
    pub fn fallback() -> Self {
        Self {
            conditions: vec![Condition {
                name: "Analysis unavailable".to_string(),
                probability: "N/A".to_string(),
            }],
            risk_level: RiskLevel::Unknown,
            suggested_tests: Vec::new(),
            notes: "Error parsing AI response".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplanationRequest {
    pub diagnosis: String,
    pub medicines: String,
}
