use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::services::IdentityService;
use shared_config::SignOutPolicy;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockInsForgeResponses, TestConfig};

fn service_for(server: &MockServer, dir: &tempfile::TempDir) -> IdentityService {
    let mut config = TestConfig::with_base_url(&server.uri());
    config.identity_snapshot_path = dir
        .path()
        .join("clinic_user.json")
        .to_string_lossy()
        .to_string();
    IdentityService::new(Arc::new(config.to_app_config()))
}

async fn mount_sign_in(server: &MockServer, user_id: &str, email: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockInsForgeResponses::auth_session(user_id, email, "token-abc"),
        ))
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer, user_id: &str, role: &str) {
    Mock::given(method("GET"))
        .and(path("/api/database/records/profiles"))
        .and(query_param("id", format!("eq.{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockInsForgeResponses::profile_row(user_id, "Stored Name", "ignored@x.com", role)
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_resolves_stored_profile_role() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sign_in(&server, "user-1", "recep@clinic.ie").await;
    mount_profile(&server, "user-1", "receptionist").await;

    let service = service_for(&server, &dir);
    let (token, identity) = service.sign_in("recep@clinic.ie", "pw").await.unwrap();

    assert_eq!(token, "token-abc");
    assert_eq!(identity.role, Role::Receptionist);
    assert_eq!(identity.name, "Stored Name");
    // The snapshot is written on every successful auth mutation.
    assert_eq!(service.current().await.unwrap(), identity);
    assert!(dir.path().join("clinic_user.json").exists());
}

#[tokio::test]
async fn reserved_admin_email_overrides_stored_role_on_sign_in() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sign_in(&server, "user-1", "admin123@gmail.com").await;
    mount_profile(&server, "user-1", "patient").await;

    let service = service_for(&server, &dir);
    let (_, identity) = service.sign_in("admin123@gmail.com", "pw").await.unwrap();

    assert_eq!(identity.role, Role::Admin);
}

#[tokio::test]
async fn sign_in_falls_back_to_metadata_role_without_profile_row() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-abc",
            "user": {
                "id": "user-2",
                "email": "x@y.com",
                "user_metadata": { "role": "doctor" }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/database/records/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = service_for(&server, &dir);
    let (_, identity) = service.sign_in("x@y.com", "pw").await.unwrap();

    assert_eq!(identity.role, Role::Doctor);
}

#[tokio::test]
async fn sign_in_failure_surfaces_platform_message() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/sessions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid credentials"))
        .mount(&server)
        .await;

    let service = service_for(&server, &dir);
    let result = service.sign_in("x@y.com", "wrong").await;

    assert_matches!(result, Err(AppError::Auth(_)));
    assert!(service.current().await.is_none());
}

#[tokio::test]
async fn restore_returns_none_for_dead_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/auth/sessions/current"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let service = service_for(&server, &dir);
    assert!(service.restore("stale-token").await.is_none());
}

#[tokio::test]
async fn restore_publishes_resolved_identity() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/auth/sessions/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-3",
            "email": "pt@y.com",
            "user_metadata": null
        })))
        .mount(&server)
        .await;
    mount_profile(&server, "user-3", "patient").await;

    let service = service_for(&server, &dir);
    let identity = service.restore("token").await.unwrap();

    assert_eq!(identity.role, Role::Patient);
    assert_eq!(service.current().await.unwrap(), identity);
}

#[tokio::test]
async fn successful_sign_out_clears_snapshot() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sign_in(&server, "user-1", "pt@y.com").await;
    mount_profile(&server, "user-1", "patient").await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth/sessions/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let service = service_for(&server, &dir);
    service.sign_in("pt@y.com", "pw").await.unwrap();
    assert!(dir.path().join("clinic_user.json").exists());

    service.sign_out("token-abc").await.unwrap();

    assert!(service.current().await.is_none());
    assert!(!dir.path().join("clinic_user.json").exists());
}

#[tokio::test]
async fn failed_sign_out_retains_snapshot_by_default() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sign_in(&server, "user-1", "pt@y.com").await;
    mount_profile(&server, "user-1", "patient").await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth/sessions/current"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let service = service_for(&server, &dir);
    service.sign_in("pt@y.com", "pw").await.unwrap();

    let result = service.sign_out("token-abc").await;

    assert_matches!(result, Err(AppError::ExternalService(_)));
    assert!(service.current().await.is_some());
    assert!(dir.path().join("clinic_user.json").exists());
}

#[tokio::test]
async fn failed_sign_out_clears_snapshot_under_always_clear_policy() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sign_in(&server, "user-1", "pt@y.com").await;
    mount_profile(&server, "user-1", "patient").await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth/sessions/current"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut config = TestConfig::with_base_url(&server.uri());
    config.identity_snapshot_path = dir
        .path()
        .join("clinic_user.json")
        .to_string_lossy()
        .to_string();
    config.sign_out_policy = SignOutPolicy::AlwaysClear;
    let service = IdentityService::new(Arc::new(config.to_app_config()));

    service.sign_in("pt@y.com", "pw").await.unwrap();
    let result = service.sign_out("token-abc").await;

    assert_matches!(result, Err(AppError::ExternalService(_)));
    assert!(service.current().await.is_none());
    assert!(!dir.path().join("clinic_user.json").exists());
}

#[tokio::test]
async fn update_role_republishes_with_only_role_changed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_sign_in(&server, "user-1", "pt@y.com").await;
    mount_profile(&server, "user-1", "patient").await;
    Mock::given(method("PATCH"))
        .and(path("/api/auth/profiles/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/database/records/profiles"))
        .and(query_param("id", "eq.user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockInsForgeResponses::profile_row("user-1", "Stored Name", "pt@y.com", "doctor")
        ])))
        .mount(&server)
        .await;

    let service = service_for(&server, &dir);
    let (_, before) = service.sign_in("pt@y.com", "pw").await.unwrap();
    assert_eq!(before.role, Role::Patient);

    let after = service.update_role("token-abc", Role::Doctor).await.unwrap();

    assert_eq!(after.role, Role::Doctor);
    assert_eq!(after.name, before.name);
    assert_eq!(after.email, before.email);
}

#[tokio::test]
async fn update_role_without_active_identity_is_an_auth_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let service = service_for(&server, &dir);
    let result = service.update_role("token", Role::Doctor).await;

    assert_matches!(result, Err(AppError::Auth(_)));
}
