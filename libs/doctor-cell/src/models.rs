use serde::{Deserialize, Serialize};

/// Row shape of the `doctors` table. `status` is a free-form label the admin
/// console displays ("active" when absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub profile_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub specialization: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub specialization: Option<String>,
    pub profile_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub status: Option<String>,
}
