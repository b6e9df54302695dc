use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;

use crate::models::{CreateDoctorRequest, Doctor, UpdateDoctorRequest};

pub struct DoctorService {
    client: InsForgeClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>> {
        let rows = self.client.select("doctors", &[], auth_token).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<Doctor> {
        let row = self
            .client
            .select_one("doctors", &[("id", doctor_id)], auth_token)
            .await?
            .ok_or_else(|| anyhow!("Doctor not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor> {
        debug!("Creating doctor record for {}", request.email);

        let row = self
            .client
            .insert(
                "doctors",
                json!({
                    "profile_id": request.profile_id,
                    "name": request.name,
                    "email": request.email,
                    "specialization": request
                        .specialization
                        .unwrap_or_else(|| "General Physician".to_string()),
                    "status": "active"
                }),
                auth_token,
            )
            .await?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: &str,
        request: UpdateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor> {
        let mut patch = serde_json::Map::new();
        if let Some(name) = request.name {
            patch.insert("name".to_string(), json!(name));
        }
        if let Some(email) = request.email {
            patch.insert("email".to_string(), json!(email));
        }
        if let Some(specialization) = request.specialization {
            patch.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(status) = request.status {
            patch.insert("status".to_string(), json!(status));
        }

        let rows = self
            .client
            .update(
                "doctors",
                &[("id", doctor_id)],
                Value::Object(patch),
                auth_token,
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Doctor not found"))?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<()> {
        self.client
            .delete("doctors", &[("id", doctor_id)], auth_token)
            .await
    }
}
