use anyhow::Result;
use chrono::Utc;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;

use crate::models::DashboardStats;

pub struct DashboardService {
    client: InsForgeClient,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    /// Independent counts raced in parallel; the first failure fails the
    /// whole join. No per-call timeout.
    pub async fn stats(&self, auth_token: &str) -> Result<DashboardStats> {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        debug!("Collecting dashboard counts for {}", today);

        let today_filter = [("date", today.as_str())];
        let (
            total_patients,
            total_doctors,
            total_appointments,
            todays_appointments,
            completed_appointments,
            confirmed_appointments,
        ) = tokio::try_join!(
            self.client.count("patients", &[], auth_token),
            self.client.count("doctors", &[], auth_token),
            self.client.count("appointments", &[], auth_token),
            self.client.count("appointments", &today_filter, auth_token),
            self.client
                .count("appointments", &[("status", "completed")], auth_token),
            self.client
                .count("appointments", &[("status", "confirmed")], auth_token),
        )?;

        Ok(DashboardStats {
            total_patients,
            total_doctors,
            total_appointments,
            todays_appointments,
            completed_appointments,
            confirmed_appointments,
        })
    }
}
