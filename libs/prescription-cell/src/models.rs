use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub dosage: String,
    pub duration: String,
}

/// Row shape of the `prescriptions` table. `medicines` is stored as a JSON
/// string, matching what the clinic's forms write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub diagnosis: String,
    pub medicines: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Prescription {
    /// Decode the stored medicines list; an unreadable value decodes to none.
    pub fn medicine_list(&self) -> Vec<Medicine> {
        serde_json::from_str(&self.medicines).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub diagnosis: String,
    pub medicines: Vec<Medicine>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListPrescriptionsQuery {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
}
