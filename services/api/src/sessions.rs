//! Portal Sessions
//!
//! An in-memory table of logged-in users keyed by an opaque token. A
//! student's portal session owns that student's tutoring conversation, so
//! logging out discards the conversation too.

use crate::models::UserRole;
use edtech_core::conversation::TutorSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Debug)]
pub struct PortalSession {
    pub username: String,
    pub role: UserRole,
    /// The student's tutoring conversation; `None` for teachers. Held for
    /// the whole classify and respond exchange of a message.
    pub tutor: Option<Mutex<TutorSession>>,
}

#[derive(Default)]
struct SessionTable {
    by_token: HashMap<Uuid, Arc<PortalSession>>,
    /// Live token of each logged-in username. Usernames are unique across roles.
    by_user: HashMap<String, Uuid>,
}

/// Logged-in users. Each username holds at most one session: logging in
/// again replaces the previous session and its tutoring conversation.
#[derive(Default)]
pub struct SessionRegistry {
    table: RwLock<SessionTable>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a login and returns its token, ending any earlier session
    /// of the same user.
    pub async fn create(&self, username: &str, role: UserRole, tutor: Option<TutorSession>) -> Uuid {
        let token = Uuid::new_v4();
        let session = PortalSession {
            username: username.to_string(),
            role,
            tutor: tutor.map(Mutex::new),
        };

        let mut table = self.table.write().await;
        if let Some(previous) = table.by_user.insert(username.to_string(), token) {
            table.by_token.remove(&previous);
            info!(%username, "Previous portal session replaced");
        }
        table.by_token.insert(token, Arc::new(session));
        info!(%username, %role, "Portal session started");
        token
    }

    pub async fn get(&self, token: &Uuid) -> Option<Arc<PortalSession>> {
        self.table.read().await.by_token.get(token).cloned()
    }

    /// Ends a login. Returns false if the token was unknown.
    pub async fn remove(&self, token: &Uuid) -> bool {
        let mut table = self.table.write().await;
        match table.by_token.remove(token) {
            Some(session) => {
                if table.by_user.get(&session.username) == Some(token) {
                    table.by_user.remove(&session.username);
                }
                info!(username = %session.username, "Portal session ended");
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub async fn active_count(&self) -> usize {
        self.table.read().await.by_token.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let registry = SessionRegistry::new();
        let token = registry
            .create("rhm", UserRole::Student, Some(TutorSession::new("sys")))
            .await;

        let session = registry.get(&token).await.expect("session exists");
        assert_eq!(session.username, "rhm");
        assert_eq!(session.tutor.as_ref().unwrap().lock().await.len(), 1);

        assert!(registry.remove(&token).await);
        assert!(registry.get(&token).await.is_none());
        assert!(!registry.remove(&token).await);
    }

    #[tokio::test]
    async fn test_login_again_replaces_previous_session() {
        let registry = SessionRegistry::new();
        let first = registry
            .create("rhm", UserRole::Student, Some(TutorSession::new("sys")))
            .await;
        let mut latest = first;
        for _ in 0..100 {
            latest = registry
                .create("rhm", UserRole::Student, Some(TutorSession::new("sys")))
                .await;
        }

        assert!(registry.get(&first).await.is_none());
        assert!(registry.get(&latest).await.is_some());
        assert_eq!(registry.active_count().await, 1);

        // A stale token cannot end the live session.
        assert!(!registry.remove(&first).await);
        assert!(registry.get(&latest).await.is_some());
    }

    #[tokio::test]
    async fn test_sessions_of_different_users_coexist() {
        let registry = SessionRegistry::new();
        let student = registry.create("rhm", UserRole::Student, None).await;
        let teacher = registry.create("rcm", UserRole::Teacher, None).await;

        assert_eq!(registry.active_count().await, 2);
        assert!(registry.remove(&student).await);
        assert!(registry.get(&teacher).await.is_some());
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_teacher_session_has_no_tutor() {
        let registry = SessionRegistry::new();
        let token = registry.create("rcm", UserRole::Teacher, None).await;
        assert!(registry.get(&token).await.unwrap().tutor.is_none());
    }
}
