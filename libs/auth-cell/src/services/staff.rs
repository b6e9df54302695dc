use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;
use shared_models::auth::ProfileRecord;

use crate::models::UpdateReceptionistRequest;

/// Admin-side staff management over the `profiles` table. Receptionists have
/// no role-specific record table; their profile row is the whole account.
/// Every query and mutation here is scoped to `role = receptionist` so the
/// admin console cannot touch other profiles through these routes.
pub struct StaffService {
    client: InsForgeClient,
}

impl StaffService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    pub async fn list_receptionists(&self, auth_token: &str) -> Result<Vec<ProfileRecord>> {
        let rows = self
            .client
            .select("profiles", &[("role", "receptionist")], auth_token)
            .await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    pub async fn update_receptionist(
        &self,
        profile_id: &str,
        request: UpdateReceptionistRequest,
        auth_token: &str,
    ) -> Result<ProfileRecord> {
        let mut patch = serde_json::Map::new();
        if let Some(name) = request.name {
            patch.insert("name".to_string(), json!(name));
        }
        if let Some(email) = request.email {
            patch.insert("email".to_string(), json!(email));
        }

        let rows = self
            .client
            .update(
                "profiles",
                &[("id", profile_id), ("role", "receptionist")],
                Value::Object(patch),
                auth_token,
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Receptionist not found"))?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_receptionist(&self, profile_id: &str, auth_token: &str) -> Result<()> {
        debug!("Removing receptionist profile {}", profile_id);
        self.client
            .delete(
                "profiles",
                &[("id", profile_id), ("role", "receptionist")],
                auth_token,
            )
            .await
    }
}
