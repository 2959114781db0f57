//! Authorization state: admin, allow-list, subscriber chats.
//!
//! The store is explicit and passed through the bot context instead of
//! living in a process global. Mutations persist to a JSON file right
//! away; the file is small and writes are rare (grant/revoke/start), so
//! synchronous I/O is fine here.

use crate::error::AlertError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fixed reply for unauthorized attempts. Never silence.
pub const REFUSAL: &str = "You are not authorized. Send your /whoami id to the admin.";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    #[serde(default)]
    allowed: BTreeSet<i64>,
    #[serde(default)]
    subscribers: BTreeSet<i64>,
}

/// Who may run gated commands and which chats receive periodic alerts.
#[derive(Debug)]
pub struct AuthStore {
    admin_id: i64,
    allowed: BTreeSet<i64>,
    subscribers: BTreeSet<i64>,
    path: Option<PathBuf>,
}

impl AuthStore {
    /// In-memory store with no persistence (tests, dry runs).
    pub fn in_memory(admin_id: i64) -> Self {
        Self {
            admin_id,
            allowed: BTreeSet::new(),
            subscribers: BTreeSet::new(),
            path: None,
        }
    }

    /// Load from a JSON file; a missing file is an empty store.
    pub fn load(admin_id: i64, path: impl AsRef<Path>) -> Result<Self, AlertError> {
        let path = path.as_ref().to_path_buf();
        let persisted = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Persisted>(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "auth store file absent, starting empty");
                Persisted::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            admin_id,
            allowed: persisted.allowed,
            subscribers: persisted.subscribers,
            path: Some(path),
        })
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let persisted = Persisted {
            allowed: self.allowed.clone(),
            subscribers: self.subscribers.clone(),
        };
        let write = serde_json::to_string_pretty(&persisted)
            .map_err(AlertError::from)
            .and_then(|raw| std::fs::write(path, raw).map_err(AlertError::from));
        if let Err(e) = write {
            // Losing a write degrades to re-granting after restart.
            warn!(path = %path.display(), error = %e, "failed to persist auth store");
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_id
    }

    /// Admins are always allowed.
    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.is_admin(user_id) || self.allowed.contains(&user_id)
    }

    /// Returns false when the user was already on the list.
    pub fn grant(&mut self, user_id: i64) -> bool {
        let inserted = self.allowed.insert(user_id);
        if inserted {
            info!(user_id = user_id, "granted access");
            self.persist();
        }
        inserted
    }

    /// Returns false when the user was not on the list.
    pub fn revoke(&mut self, user_id: i64) -> bool {
        let removed = self.allowed.remove(&user_id);
        if removed {
            info!(user_id = user_id, "revoked access");
            self.persist();
        }
        removed
    }

    /// Register a chat for periodic alerts.
    pub fn subscribe(&mut self, chat_id: i64) -> bool {
        let inserted = self.subscribers.insert(chat_id);
        if inserted {
            self.persist();
        }
        inserted
    }

    pub fn subscribers(&self) -> Vec<i64> {
        self.subscribers.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("heli-auth-{}-{}.json", std::process::id(), name))
    }

    #[test]
    fn test_admin_is_always_allowed() {
        let store = AuthStore::in_memory(42);
        assert!(store.is_allowed(42));
        assert!(store.is_admin(42));
        assert!(!store.is_allowed(7));
    }

    #[test]
    fn test_grant_and_revoke() {
        let mut store = AuthStore::in_memory(42);

        assert!(store.grant(7));
        assert!(!store.grant(7));
        assert!(store.is_allowed(7));
        assert!(!store.is_admin(7));

        assert!(store.revoke(7));
        assert!(!store.revoke(7));
        assert!(!store.is_allowed(7));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);

        let store = AuthStore::load(1, &path).unwrap();
        assert!(store.subscribers().is_empty());
        assert!(!store.is_allowed(2));
    }

    #[test]
    fn test_mutations_survive_reload() {
        let path = temp_path("reload");
        let _ = std::fs::remove_file(&path);

        let mut store = AuthStore::load(1, &path).unwrap();
        store.grant(7);
        store.subscribe(-100200);

        let reloaded = AuthStore::load(1, &path).unwrap();
        assert!(reloaded.is_allowed(7));
        assert_eq!(reloaded.subscribers(), vec![-100200]);

        let _ = std::fs::remove_file(&path);
    }
}
