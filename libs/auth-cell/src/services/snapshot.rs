use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use shared_models::auth::Identity;

/// Local persisted copy of the resolved identity, the service-side analogue
/// of the SPA's fixed localStorage key. Written on every successful auth
/// mutation, read once for warm start.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Best effort: any read or parse failure means no snapshot.
    pub fn load(&self) -> Option<Identity> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!("Discarding unreadable identity snapshot: {}", e);
                None
            }
        }
    }

    pub fn save(&self, identity: &Identity) -> Result<()> {
        let raw = serde_json::to_string(identity)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
