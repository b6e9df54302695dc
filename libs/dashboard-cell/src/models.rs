use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub total_doctors: u64,
    pub total_appointments: u64,
    pub todays_appointments: u64,
    pub completed_appointments: u64,
    pub confirmed_appointments: u64,
}
