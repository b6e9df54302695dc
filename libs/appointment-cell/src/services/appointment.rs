use anyhow::{anyhow, Result};
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::insforge::InsForgeClient;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, ListAppointmentsQuery,
};

pub struct AppointmentService {
    client: InsForgeClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: InsForgeClient::new(config),
        }
    }

    pub async fn list_appointments(
        &self,
        query: ListAppointmentsQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let date = query.date.map(|d| d.format("%Y-%m-%d").to_string());

        let mut filters: Vec<(&str, &str)> = Vec::new();
        if let Some(date) = date.as_deref() {
            filters.push(("date", date));
        }
        if let Some(doctor_id) = query.doctor_id.as_deref() {
            filters.push(("doctor_id", doctor_id));
        }
        if let Some(patient_id) = query.patient_id.as_deref() {
            filters.push(("patient_id", patient_id));
        }
        if let Some(status) = query.status {
            filters.push(("status", status.as_str()));
        }

        let rows = self.client.select("appointments", &filters, auth_token).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Insert the appointment row with the status the caller's role dictates:
    /// front-desk bookings land confirmed, patient requests land pending.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment> {
        debug!(
            "Booking {} appointment for patient {} with doctor {}",
            status.as_str(),
            request.patient_id,
            request.doctor_id
        );

        let row = self
            .client
            .insert(
                "appointments",
                json!({
                    "patient_id": request.patient_id,
                    "doctor_id": request.doctor_id,
                    "date": request.date.format("%Y-%m-%d").to_string(),
                    "time": request.time,
                    "type": request.appointment_type,
                    "status": status.as_str(),
                    "notes": request.notes
                }),
                auth_token,
            )
            .await?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn update_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment> {
        let rows = self
            .client
            .update(
                "appointments",
                &[("id", appointment_id)],
                json!({ "status": status.as_str() }),
                auth_token,
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Appointment not found"))?;
        Ok(serde_json::from_value(row)?)
    }
}
