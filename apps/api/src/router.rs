use std::sync::Arc;

use axum::{routing::get, Router};

use ai_cell::router::{ai_chat_routes, ai_checker_routes};
use appointment_cell::router::appointment_routes;
use auth_cell::router::{auth_routes, staff_routes};
use auth_cell::services::IdentityService;
use dashboard_cell::router::dashboard_routes;
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use prescription_cell::router::prescription_routes;
use shared_config::AppConfig;
use shared_utils::guard::{ADMIN_ONLY, DOCTOR_ONLY, PATIENT_ONLY, RECEPTIONIST_ONLY};

/// Role-prefixed route trees, one per dashboard. The same cell mounts under
/// several prefixes with different allowed-role sets, mirroring how each
/// console sees its own slice of the clinic's data.
pub fn create_router(config: Arc<AppConfig>, identity: Arc<IdentityService>) -> Router {
    Router::new()
        .route("/", get(|| async { "ClinicFlow API is running!" }))
        .nest("/auth", auth_routes(config.clone(), identity))
        // Admin console
        .nest("/admin/doctors", doctor_routes(config.clone(), ADMIN_ONLY))
        .nest("/admin/patients", patient_routes(config.clone(), ADMIN_ONLY))
        .nest(
            "/admin/appointments",
            appointment_routes(config.clone(), ADMIN_ONLY),
        )
        .nest(
            "/admin/receptionists",
            staff_routes(config.clone(), ADMIN_ONLY),
        )
        .nest("/admin", dashboard_routes(config.clone(), ADMIN_ONLY))
        // Doctor console
        .nest(
            "/doctor/appointments",
            appointment_routes(config.clone(), DOCTOR_ONLY),
        )
        .nest("/doctor/patients", patient_routes(config.clone(), DOCTOR_ONLY))
        .nest(
            "/doctor/prescriptions",
            prescription_routes(config.clone(), DOCTOR_ONLY),
        )
        .nest("/doctor/ai", ai_checker_routes(config.clone(), DOCTOR_ONLY))
        // Receptionist console
        .nest(
            "/receptionist/appointments",
            appointment_routes(config.clone(), RECEPTIONIST_ONLY),
        )
        .nest(
            "/receptionist/patients",
            patient_routes(config.clone(), RECEPTIONIST_ONLY),
        )
        // Patient console
        .nest(
            "/patient/appointments",
            appointment_routes(config.clone(), PATIENT_ONLY),
        )
        .nest(
            "/patient/prescriptions",
            prescription_routes(config.clone(), PATIENT_ONLY),
        )
        .nest("/patient/ai", ai_chat_routes(config, PATIENT_ONLY))
}
