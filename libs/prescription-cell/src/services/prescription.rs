use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;

use crate::models::{CreatePrescriptionRequest, ListPrescriptionsQuery, Prescription};

pub struct PrescriptionService {
    client: InsForgeClient,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    pub async fn list_prescriptions(
        &self,
        query: ListPrescriptionsQuery,
        auth_token: &str,
    ) -> Result<Vec<Prescription>> {
        let mut filters: Vec<(&str, &str)> = Vec::new();
        if let Some(patient_id) = query.patient_id.as_deref() {
            filters.push(("patient_id", patient_id));
        }
        if let Some(doctor_id) = query.doctor_id.as_deref() {
            filters.push(("doctor_id", doctor_id));
        }

        let rows = self
            .client
            .select("prescriptions", &filters, auth_token)
            .await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    pub async fn create_prescription(
        &self,
        request: CreatePrescriptionRequest,
        auth_token: &str,
    ) -> Result<Prescription> {
        debug!(
            "Writing prescription for patient {} by doctor {}",
            request.patient_id, request.doctor_id
        );

        let row = self
            .client
            .insert(
                "prescriptions",
                json!({
                    "patient_id": request.patient_id,
                    "doctor_id": request.doctor_id,
                    "diagnosis": request.diagnosis,
                    "medicines": serde_json::to_string(&request.medicines)?,
                    "notes": request.notes,
                    "created_at": Utc::now().to_rfc3339()
                }),
                auth_token,
            )
            .await?;

        Ok(serde_json::from_value(row)?)
    }
}
