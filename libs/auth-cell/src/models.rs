use serde::{Deserialize, Serialize};

use shared_models::auth::{Identity, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub identity: Identity,
}

fn default_role() -> Role {
    Role::Patient
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub success: bool,
    pub require_verification: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub otp: String,
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub access_token: String,
    pub identity: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReceptionistRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReceptionistRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Session restore payload. A missing session is not an error, just an
/// absent identity.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub identity: Option<Identity>,
}
