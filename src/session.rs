use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Recruiter,
    Both,
    Other(String), // "STUDENT", "ADMIN", ...
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "RECRUITER" => Role::Recruiter,
            "BOTH" => Role::Both,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Recruiter => "RECRUITER".to_string(),
            Role::Both => "BOTH".to_string(),
            Role::Other(s) => s,
        }
    }
}

impl Role {
    pub fn can_recruit(&self) -> bool {
        matches!(self, Role::Recruiter | Role::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: User,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Loading,
    SignedOut,
    SignedIn(StoredSession),
}

/// Places a gated screen may send the user instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    UserDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Auth => "/auth",
            Route::UserDashboard => "/user/dashboard",
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Gate<'a> {
    /// Session not resolved yet; render nothing and don't redirect.
    Wait,
    Redirect(Route),
    Allow(&'a StoredSession),
}

/// Recruiter-only screens: signed-out users go to sign-in, other roles go to
/// their own dashboard.
pub fn gate(state: &SessionState) -> Gate<'_> {
    match state {
        SessionState::Loading => Gate::Wait,
        SessionState::SignedOut => Gate::Redirect(Route::Auth),
        SessionState::SignedIn(session) if !session.user.role.can_recruit() => {
            Gate::Redirect(Route::UserDashboard)
        }
        SessionState::SignedIn(session) => Gate::Allow(session),
    }
}

/// Session file under the platform config directory.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open() -> Result<Self, SessionError> {
        let proj_dirs =
            directories::ProjectDirs::from("", "", "recruit").ok_or(SessionError::NoConfigDir)?;
        Ok(Self::at(proj_dirs.config_dir().join("session.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SessionState, SessionError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no session file");
            return Ok(SessionState::SignedOut);
        }
        let raw = fs::read_to_string(&self.path)?;
        let session: StoredSession = serde_json::from_str(&raw)?;
        Ok(SessionState::SignedIn(session))
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// Returns whether a session was present.
    pub fn clear(&self) -> Result<bool, SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session(role: &str) -> StoredSession {
        StoredSession {
            user: User {
                id: "user-1".to_string(),
                email: "hr@example.com".to_string(),
                role: Role::from(role.to_string()),
            },
            token: Some("t0ken".to_string()),
        }
    }

    #[test]
    fn test_gate_waits_while_loading() {
        assert_eq!(gate(&SessionState::Loading), Gate::Wait);
    }

    #[test]
    fn test_gate_sends_signed_out_users_to_auth() {
        assert_eq!(gate(&SessionState::SignedOut), Gate::Redirect(Route::Auth));
        assert_eq!(Route::Auth.path(), "/auth");
    }

    #[test]
    fn test_gate_sends_students_to_user_dashboard() {
        let state = SessionState::SignedIn(session("STUDENT"));
        assert_eq!(gate(&state), Gate::Redirect(Route::UserDashboard));
        assert_eq!(Route::UserDashboard.path(), "/user/dashboard");
    }

    #[test]
    fn test_gate_allows_recruiters_and_both() {
        for role in ["RECRUITER", "BOTH", "recruiter"] {
            let state = SessionState::SignedIn(session(role));
            assert!(matches!(gate(&state), Gate::Allow(s) if s.user.id == "user-1"));
        }
    }

    #[test]
    fn test_role_round_trips_through_json() {
        let json = serde_json::to_string(&session("BOTH")).unwrap();
        assert!(json.contains(r#""role":"BOTH""#));
        let other: Role = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(other, Role::Other("ADMIN".to_string()));
    }

    #[test]
    fn test_store_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("nested").join("session.json"));

        assert!(matches!(store.load().unwrap(), SessionState::SignedOut));

        store.save(&session("RECRUITER")).unwrap();
        match store.load().unwrap() {
            SessionState::SignedIn(s) => {
                assert_eq!(s.user.role, Role::Recruiter);
                assert_eq!(s.token.as_deref(), Some("t0ken"));
            }
            other => panic!("expected signed in, got {:?}", other),
        }

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SessionStore::at(&path).load(),
            Err(SessionError::Corrupt(_))
        ));
    }
}
