use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;

use crate::models::{CreatePatientRequest, Patient, UpdatePatientRequest};

pub struct PatientService {
    client: InsForgeClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    pub async fn list_patients(&self, auth_token: &str) -> Result<Vec<Patient>> {
        let rows = self.client.select("patients", &[], auth_token).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    pub async fn get_patient(&self, patient_id: &str, auth_token: &str) -> Result<Patient> {
        let row = self
            .client
            .select_one("patients", &[("id", patient_id)], auth_token)
            .await?
            .ok_or_else(|| anyhow!("Patient not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient> {
        debug!("Creating patient record for {}", request.email);

        let existing = self
            .client
            .select("patients", &[("email", &request.email)], auth_token)
            .await?;
        if !existing.is_empty() {
            return Err(anyhow!("Patient with email {} already exists", request.email));
        }

        let row = self
            .client
            .insert(
                "patients",
                json!({
                    "profile_id": request.profile_id,
                    "name": request.name,
                    "email": request.email,
                    "visits": 0
                }),
                auth_token,
            )
            .await?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient> {
        let mut patch = serde_json::Map::new();
        if let Some(name) = request.name {
            patch.insert("name".to_string(), json!(name));
        }
        if let Some(email) = request.email {
            patch.insert("email".to_string(), json!(email));
        }
        if let Some(visits) = request.visits {
            patch.insert("visits".to_string(), json!(visits));
        }

        let rows = self
            .client
            .update(
                "patients",
                &[("id", patient_id)],
                Value::Object(patch),
                auth_token,
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Patient not found"))?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_patient(&self, patient_id: &str, auth_token: &str) -> Result<()> {
        self.client
            .delete("patients", &[("id", patient_id)], auth_token)
            .await
    }
}
