use serde::{Deserialize, Serialize};

/// The one email that is always resolved to the admin role, regardless of
/// what the stored profile says.
pub const RESERVED_ADMIN_EMAIL: &str = "admin123@gmail.com";

/// Closed set of clinic roles. Anything else coming from a profile record or
/// session metadata parses to `Unknown`, which no route's allowed set
/// contains, so callers are forced to handle it instead of inheriting a
/// silent `patient` default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
    Patient,
    Unknown,
}

impl Role {
    pub fn parse(value: &str) -> Role {
        match value {
            "admin" => Role::Admin,
            "doctor" => Role::Doctor,
            "receptionist" => Role::Receptionist,
            "patient" => Role::Patient,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
            Role::Patient => "patient",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// The platform-issued session as the client sees it: a read-only, possibly
/// stale view of who is signed in, decoded from the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub metadata_name: Option<String>,
    pub metadata_role: Option<String>,
}

/// Row shape of the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Application-level identity derived from the session and the profile row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Identity {
    /// Join a session with an optional stored profile into the authoritative
    /// identity. Role precedence: stored profile role, then session metadata
    /// role, then `patient`. The reserved admin email overrides all of it.
    /// Display name precedence: profile name, then metadata name, then the
    /// local part of the email.
    pub fn resolve(session: &Session, profile: Option<&ProfileRecord>) -> Identity {
        let mut role = profile
            .and_then(|p| p.role.as_deref())
            .map(Role::parse)
            .or_else(|| session.metadata_role.as_deref().map(Role::parse))
            .unwrap_or(Role::Patient);

        if session.email == RESERVED_ADMIN_EMAIL {
            role = Role::Admin;
        }

        let name = profile
            .and_then(|p| p.name.clone())
            .or_else(|| session.metadata_name.clone())
            .unwrap_or_else(|| {
                session
                    .email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            });

        Identity {
            id: session.user_id.clone(),
            email: session.email.clone(),
            name,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(email: &str, metadata_role: Option<&str>) -> Session {
        Session {
            user_id: "user-1".to_string(),
            email: email.to_string(),
            metadata_name: None,
            metadata_role: metadata_role.map(String::from),
        }
    }

    fn profile(role: Option<&str>) -> ProfileRecord {
        ProfileRecord {
            id: "user-1".to_string(),
            name: Some("Stored Name".to_string()),
            email: None,
            role: role.map(String::from),
        }
    }

    #[test]
    fn reserved_admin_email_overrides_stored_role() {
        let identity = Identity::resolve(
            &session(RESERVED_ADMIN_EMAIL, None),
            Some(&profile(Some("patient"))),
        );
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn stored_profile_role_wins_over_metadata() {
        let identity = Identity::resolve(
            &session("x@y.com", Some("doctor")),
            Some(&profile(Some("receptionist"))),
        );
        assert_eq!(identity.role, Role::Receptionist);
    }

    #[test]
    fn metadata_role_used_when_profile_role_absent() {
        let identity =
            Identity::resolve(&session("x@y.com", Some("doctor")), Some(&profile(None)));
        assert_eq!(identity.role, Role::Doctor);
    }

    #[test]
    fn metadata_role_used_when_profile_missing() {
        let identity = Identity::resolve(&session("x@y.com", Some("doctor")), None);
        assert_eq!(identity.role, Role::Doctor);
    }

    #[test]
    fn defaults_to_patient_when_no_role_anywhere() {
        let identity = Identity::resolve(&session("x@y.com", None), Some(&profile(None)));
        assert_eq!(identity.role, Role::Patient);
    }

    #[test]
    fn arbitrary_role_string_parses_to_unknown() {
        let identity =
            Identity::resolve(&session("x@y.com", None), Some(&profile(Some("superuser"))));
        assert_eq!(identity.role, Role::Unknown);
    }

    #[test]
    fn name_falls_back_to_email_local_part() {
        let identity = Identity::resolve(&session("jane.doe@clinic.ie", None), None);
        assert_eq!(identity.name, "jane.doe");
    }

    #[test]
    fn profile_name_preferred_over_metadata_name() {
        let mut s = session("x@y.com", None);
        s.metadata_name = Some("Meta Name".to_string());
        let identity = Identity::resolve(&s, Some(&profile(None)));
        assert_eq!(identity.name, "Stored Name");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Receptionist).unwrap(),
            "\"receptionist\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"admin\"").unwrap(),
            Role::Admin
        );
    }
}
