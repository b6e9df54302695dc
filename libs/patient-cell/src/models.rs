use serde::{Deserialize, Serialize};

/// Row shape of the `patients` table. `visits` is maintained by the clinic
/// staff, starting at zero on registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub profile_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub visits: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub profile_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub visits: Option<i64>,
}
