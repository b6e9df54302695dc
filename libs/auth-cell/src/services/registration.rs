use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;
use shared_models::auth::{Identity, Role, RESERVED_ADMIN_EMAIL};
use shared_models::error::AppError;

use crate::models::{SignUpRequest, VerifyRequest};
use crate::services::identity::session_from_user;

#[derive(Debug)]
pub struct SignUpOutcome {
    pub require_verification: bool,
}

#[derive(Debug)]
pub struct VerifyOutcome {
    pub access_token: String,
    pub identity: Identity,
}

/// Credential registration and the follow-up profile/role-record writes.
/// The platform cannot give us a transaction across its auth store and the
/// record tables, so the multi-step write runs as a small saga: a failed
/// role-record insert deletes the just-created profile row before surfacing
/// the error. A failed profile insert after a successful credential insert
/// still leaves an account without a profile; that window cannot be closed
/// from this side.
pub struct RegistrationService {
    client: InsForgeClient,
}

impl RegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> Result<SignUpOutcome, AppError> {
        debug!("Registering credential for {}", request.email);

        let response = self
            .client
            .sign_up(&request.email, &request.password, &request.name)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        if response.require_email_verification {
            // No records yet. They are created once the OTP verification
            // completes, so an unverified account never owns orphan rows.
            return Ok(SignUpOutcome {
                require_verification: true,
            });
        }

        let token = response
            .access_token
            .ok_or_else(|| AppError::ExternalService("Registration returned no session".to_string()))?;
        let user = response
            .user
            .ok_or_else(|| AppError::ExternalService("Registration returned no user".to_string()))?;

        self.client
            .set_profile(&token, Some(&request.name), Some(request.role.as_str()))
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        self.create_clinic_records(&token, &user.id, &request.name, &request.email, request.role)
            .await?;

        Ok(SignUpOutcome {
            require_verification: false,
        })
    }

    pub async fn verify(&self, request: VerifyRequest) -> Result<VerifyOutcome, AppError> {
        debug!("Verifying registration for {}", request.email);

        let auth = self
            .client
            .verify_email(&request.email, &request.otp)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let role = request.role.unwrap_or(Role::Patient);
        let name = request.name.clone().unwrap_or_else(|| {
            request
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });

        self.client
            .set_profile(&auth.access_token, Some(&name), Some(role.as_str()))
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        self.create_clinic_records(
            &auth.access_token,
            &auth.user.id,
            &name,
            &request.email,
            role,
        )
        .await?;

        let session = session_from_user(&auth.user);
        let mut identity = Identity::resolve(&session, None);
        identity.name = name;
        // The reserved admin address keeps its forced role.
        if session.email != RESERVED_ADMIN_EMAIL {
            identity.role = role;
        }

        Ok(VerifyOutcome {
            access_token: auth.access_token,
            identity,
        })
    }

    /// One profiles row plus one role-specific row per registration.
    async fn create_clinic_records(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<(), AppError> {
        self.client
            .insert(
                "profiles",
                json!({
                    "id": user_id,
                    "name": name,
                    "email": email,
                    "role": role.as_str()
                }),
                token,
            )
            .await
            .map_err(|e| AppError::Database(format!("Profile creation failed: {}", e)))?;

        let role_row = match role {
            Role::Patient => Some((
                "patients",
                json!({
                    "profile_id": user_id,
                    "name": name,
                    "email": email,
                    "visits": 0
                }),
            )),
            Role::Doctor => Some((
                "doctors",
                json!({
                    "profile_id": user_id,
                    "name": name,
                    "email": email,
                    "specialization": "General Physician"
                }),
            )),
            _ => None,
        };

        if let Some((table, row)) = role_row {
            if let Err(e) = self.client.insert(table, row, token).await {
                // Compensate so the registration does not leave a profile
                // without its role record.
                if let Err(rollback) = self
                    .client
                    .delete("profiles", &[("id", user_id)], token)
                    .await
                {
                    warn!(
                        "Compensating profile delete failed for {}: {}",
                        user_id, rollback
                    );
                }
                return Err(AppError::Database(format!(
                    "{} record creation failed, profile rolled back: {}",
                    role, e
                )));
            }
        }

        Ok(())
    }
}
