//! File-backed persistence of the signed-in session.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientResult;
use crate::models::{AuthPayload, SessionUser, SessionUserPatch};

/// Tokens plus the cached user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

impl From<&AuthPayload> for Session {
    fn from(auth: &AuthPayload) -> Self {
        Self {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            user: SessionUser::from(auth),
        }
    }
}

/// Stores one [`Session`] as a JSON file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// A store backed by `path`. Nothing is read until [`SessionStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session. A missing or unreadable file yields `None`.
    pub async fn load(&self) -> Option<Session> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    /// Persist `session`, replacing whatever was stored.
    pub async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(session)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), user = %session.user.username, "Session saved");
        Ok(())
    }

    /// Forget the stored session.
    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Merge `patch` into the stored user and persist the result.
    ///
    /// Returns the updated session, or `None` when nobody is signed in.
    pub async fn update_user(&self, patch: SessionUserPatch) -> ClientResult<Option<Session>> {
        let Some(mut session) = self.load().await else {
            return Ok(None);
        };

        apply_patch(&mut session.user, patch);
        self.save(&session).await?;
        Ok(Some(session))
    }
}

pub(crate) fn apply_patch(user: &mut SessionUser, patch: SessionUserPatch) {
    if let Some(display_name) = patch.display_name {
        user.display_name = display_name;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if patch.avatar_url.is_some() {
        user.avatar_url = patch.avatar_url;
    }
    if patch.bio.is_some() {
        user.bio = patch.bio;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            user: SessionUser {
                id: Uuid::new_v4(),
                username: "alice".into(),
                email: "alice@example.com".into(),
                display_name: "Alice".into(),
                role: "USER".into(),
                avatar_url: None,
                bio: None,
            },
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested/session.json"));
        let original = session();

        store.save(&original).await.unwrap();

        assert_eq!(store.load().await, Some(original));
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(SessionStore::new(path).load().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session()).await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_update_user_merges_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&session()).await.unwrap();

        let updated = store
            .update_user(SessionUserPatch {
                display_name: Some("Alice L.".into()),
                bio: Some("Blue team".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.user.display_name, "Alice L.");
        assert_eq!(updated.user.email, "alice@example.com");
        assert_eq!(store.load().await.unwrap().user.bio.as_deref(), Some("Blue team"));
    }

    #[tokio::test]
    async fn test_update_user_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let result = store.update_user(SessionUserPatch::default()).await.unwrap();

        assert!(result.is_none());
    }
}
