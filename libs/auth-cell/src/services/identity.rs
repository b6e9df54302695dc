use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_config::{AppConfig, SignOutPolicy};
use shared_database::insforge::{AuthUser, InsForgeClient};
use shared_models::auth::{Identity, ProfileRecord, Role, Session};
use shared_models::error::AppError;

use crate::services::snapshot::SnapshotStore;

/// Owns the one published identity for the process. Created at startup,
/// injected through router state; nothing else is allowed to write it.
pub struct IdentityService {
    config: Arc<AppConfig>,
    client: InsForgeClient,
    snapshot: SnapshotStore,
    current: RwLock<Option<Identity>>,
}

pub(crate) fn session_from_user(user: &AuthUser) -> Session {
    let metadata_name = user
        .user_metadata
        .as_ref()
        .and_then(|m| m.get("name"))
        .and_then(|v| v.as_str())
        .map(String::from);
    let metadata_role = user
        .user_metadata
        .as_ref()
        .and_then(|m| m.get("role"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Session {
        user_id: user.id.clone(),
        email: user.email.clone(),
        metadata_name,
        metadata_role,
    }
}

impl IdentityService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let client = InsForgeClient::new(&config);
        let snapshot = SnapshotStore::new(&config.identity_snapshot_path);
        // Warm start from the persisted snapshot; the next restore or sign-in
        // recomputes from scratch.
        let cached = snapshot.load();

        Self {
            config,
            client,
            snapshot,
            current: RwLock::new(cached),
        }
    }

    pub async fn current(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, identity: Identity) {
        if let Err(e) = self.snapshot.save(&identity) {
            warn!("Failed to persist identity snapshot: {}", e);
        }
        *self.current.write().await = Some(identity);
    }

    async fn clear(&self) {
        if let Err(e) = self.snapshot.clear() {
            warn!("Failed to clear identity snapshot: {}", e);
        }
        *self.current.write().await = None;
    }

    async fn fetch_profile(&self, user_id: &str, token: &str) -> Option<ProfileRecord> {
        match self
            .client
            .select_one("profiles", &[("id", user_id)], token)
            .await
        {
            Ok(Some(row)) => serde_json::from_value(row).ok(),
            Ok(None) => None,
            Err(e) => {
                debug!("Profile fetch failed for {}: {}", user_id, e);
                None
            }
        }
    }

    /// Startup restore: confirm the session with the platform, join it with
    /// the stored profile, publish and persist the result. A dead session
    /// yields `None` rather than an error.
    pub async fn restore(&self, token: &str) -> Option<Identity> {
        let user = match self.client.current_session(token).await {
            Ok(user) => user,
            Err(e) => {
                debug!("Session check failed: {}", e);
                return None;
            }
        };

        let session = session_from_user(&user);
        let profile = self.fetch_profile(&session.user_id, token).await;
        let identity = Identity::resolve(&session, profile.as_ref());

        self.publish(identity.clone()).await;
        Some(identity)
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Identity), AppError> {
        let auth = self
            .client
            .sign_in(email, password)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let session = session_from_user(&auth.user);
        let profile = self.fetch_profile(&session.user_id, &auth.access_token).await;
        let identity = Identity::resolve(&session, profile.as_ref());

        self.publish(identity.clone()).await;
        Ok((auth.access_token, identity))
    }

    /// Remote sign-out plus local teardown. What happens to the snapshot when
    /// the remote call fails is policy, not hardcoded.
    pub async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        match self.client.sign_out(token).await {
            Ok(()) => {
                self.clear().await;
                Ok(())
            }
            Err(e) => {
                if self.config.sign_out_policy == SignOutPolicy::AlwaysClear {
                    self.clear().await;
                }
                Err(AppError::ExternalService(e.to_string()))
            }
        }
    }

    /// Writes the role to both the auth-profile mechanism and the profiles
    /// row, then republishes the in-memory identity with only the role
    /// changed. Other fields are not re-queried, so they can drift from the
    /// backing store until the next full restore.
    pub async fn update_role(&self, token: &str, role: Role) -> Result<Identity, AppError> {
        let mut identity = self
            .current()
            .await
            .ok_or_else(|| AppError::Auth("No active identity".to_string()))?;

        self.client
            .set_profile(token, None, Some(role.as_str()))
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        self.client
            .update(
                "profiles",
                &[("id", &identity.id)],
                serde_json::json!({ "role": role.as_str() }),
                token,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        identity.role = role;
        self.publish(identity.clone()).await;
        Ok(identity)
    }
}
