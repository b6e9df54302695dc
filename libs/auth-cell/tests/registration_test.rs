use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::models::{SignUpRequest, VerifyRequest};
use auth_cell::services::RegistrationService;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::test_utils::TestConfig;

fn sign_up_request(role: Role) -> SignUpRequest {
    SignUpRequest {
        email: "new@clinic.ie".to_string(),
        password: "pw".to_string(),
        name: "New User".to_string(),
        role,
    }
}

async fn mount_set_profile(server: &MockServer) {
    Mock::given(method("PATCH"))
        .and(path("/api/auth/profiles/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

fn registered_user(verification: bool) -> serde_json::Value {
    if verification {
        json!({ "require_email_verification": true })
    } else {
        json!({
            "access_token": "token-new",
            "user": { "id": "user-new", "email": "new@clinic.ie", "user_metadata": null },
            "require_email_verification": false
        })
    }
}

#[tokio::test]
async fn pending_verification_creates_no_records() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registered_user(true)))
        .mount(&server)
        .await;
    // Neither the profiles row nor any role record may exist yet.
    Mock::given(method("POST"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let outcome = service.sign_up(sign_up_request(Role::Patient)).await.unwrap();

    assert!(outcome.require_verification);
}

#[tokio::test]
async fn immediate_sign_up_creates_one_profile_and_one_patient_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registered_user(false)))
        .mount(&server)
        .await;
    mount_set_profile(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "user-new" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "p-1", "visits": 0 }])))
        .expect(1)
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let outcome = service.sign_up(sign_up_request(Role::Patient)).await.unwrap();

    assert!(!outcome.require_verification);
}

#[tokio::test]
async fn doctor_sign_up_creates_doctor_row_with_default_specialization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registered_user(false)))
        .mount(&server)
        .await;
    mount_set_profile(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "user-new" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!([{ "id": "d-1", "specialization": "General Physician" }]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let outcome = service.sign_up(sign_up_request(Role::Doctor)).await.unwrap();

    assert!(!outcome.require_verification);
}

#[tokio::test]
async fn failed_role_record_insert_rolls_back_the_profile_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registered_user(false)))
        .mount(&server)
        .await;
    mount_set_profile(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "user-new" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_string("insert failed"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/database/records/profiles"))
        .and(query_param("id", "eq.user-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let result = service.sign_up(sign_up_request(Role::Patient)).await;

    assert_matches!(result, Err(AppError::Database(_)));
}

#[tokio::test]
async fn verify_completes_registration_and_resolves_identity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-verified",
            "user": { "id": "user-new", "email": "new@clinic.ie", "user_metadata": null }
        })))
        .mount(&server)
        .await;
    mount_set_profile(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "user-new" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "d-1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let outcome = service
        .verify(VerifyRequest {
            email: "new@clinic.ie".to_string(),
            otp: "123456".to_string(),
            name: Some("Dr New".to_string()),
            role: Some(Role::Doctor),
        })
        .await
        .unwrap();

    assert_eq!(outcome.access_token, "token-verified");
    assert_eq!(outcome.identity.role, Role::Doctor);
    assert_eq!(outcome.identity.name, "Dr New");
}

#[tokio::test]
async fn verify_keeps_the_reserved_admin_role() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-admin",
            "user": { "id": "user-a", "email": "admin123@gmail.com", "user_metadata": null }
        })))
        .mount(&server)
        .await;
    mount_set_profile(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "user-a" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/database/records/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "p-a" }])))
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let outcome = service
        .verify(VerifyRequest {
            email: "admin123@gmail.com".to_string(),
            otp: "123456".to_string(),
            name: None,
            role: Some(Role::Patient),
        })
        .await
        .unwrap();

    assert_eq!(outcome.identity.role, Role::Admin);
}

#[tokio::test]
async fn expired_otp_surfaces_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-email"))
        .respond_with(ResponseTemplate::new(400).set_body_string("OTP expired"))
        .mount(&server)
        .await;

    let service = RegistrationService::new(&TestConfig::with_base_url(&server.uri()).to_app_config());
    let result = service
        .verify(VerifyRequest {
            email: "new@clinic.ie".to_string(),
            otp: "000000".to_string(),
            name: None,
            role: None,
        })
        .await;

    assert_matches!(result, Err(AppError::Auth(_)));
}
