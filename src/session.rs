use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Sessions issued by the server are honored client-side for one day, after
/// which the stored copy is treated as absent.
const SESSION_TTL_DAYS: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl User {
    /// Up to two uppercase initials for the dashboard header, "U" when the
    /// name is empty.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// An authenticated session: the opaque bearer token plus the cached user
/// profile. Validity is ultimately the server's call; the client only
/// enforces the one-day lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    pub fn new(token: String, user: User) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            user,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Persists the session as a JSON file. Nothing else touches the file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored session, if any. An expired session is cleared and
    /// reported as absent; an unreadable file is just absent.
    pub fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }
        let data = fs::read_to_string(&self.path).ok()?;
        let session: Session = serde_json::from_str(&data).ok()?;
        if session.is_expired() {
            tracing::debug!("stored session expired, clearing");
            self.clear();
            return None;
        }
        Some(session)
    }

    pub fn save(&self, session: &Session) {
        match serde_json::to_string_pretty(session) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    tracing::warn!(%err, "failed to write session file");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize session"),
        }
    }

    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                tracing::warn!(%err, "failed to remove session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "ana@example.com".to_string(),
            name: "Ana Souza".to_string(),
        }
    }

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        (dir, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let session = Session::new("tok-123".to_string(), user());
        store.save(&session);

        let loaded = store.load().expect("session should load");
        assert_eq!(loaded.token, "tok-123");
        assert_eq!(loaded.user, session.user);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let (_dir, store) = store();
        assert!(store.load().is_none());
    }

    #[test]
    fn expired_session_loads_as_none_and_is_cleared() {
        let (_dir, store) = store();
        let mut session = Session::new("tok-123".to_string(), user());
        session.expires_at = Utc::now() - Duration::hours(1);
        store.save(&session);

        assert!(store.load().is_none());
        // A second load must not see the stale file either.
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_removes_the_session() {
        let (_dir, store) = store();
        store.save(&Session::new("tok-123".to_string(), user()));
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::new(path).load().is_none());
    }

    #[test]
    fn initials_take_the_first_two_name_parts() {
        assert_eq!(user().initials(), "AS");
        let mononym = User {
            name: "Plato".to_string(),
            ..user()
        };
        assert_eq!(mononym.initials(), "P");
        let unnamed = User {
            name: String::new(),
            ..user()
        };
        assert_eq!(unnamed.initials(), "U");
    }
}
