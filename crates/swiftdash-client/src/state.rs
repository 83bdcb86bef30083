//! Application state shared by every front end.
//!
//! Owns the two stores, the user table and the notification channel, and
//! keeps the Conversation Store following the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::info;

use swiftdash_store::{Database, StoreError};

use crate::config::ClientConfig;
use crate::conversations::ConversationStore;
use crate::directory::UserDirectory;
use crate::events::Notifier;
use crate::roster::Roster;
use crate::session::SessionStore;

/// Central application state.
///
/// Must be built inside a Tokio runtime: the session follower is spawned
/// on construction and aborted on drop.
pub struct AppState {
    pub config: ClientConfig,
    pub notifier: Notifier,
    pub session: SessionStore,
    pub chat: ConversationStore,
    directory: Mutex<UserDirectory>,
    follower: JoinHandle<()>,
}

impl AppState {
    /// Open the database at `config.db_path`, or the platform data
    /// directory when unset.
    pub fn open(config: ClientConfig) -> Result<Self, StoreError> {
        let db = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };
        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: ClientConfig, db: Database) -> Self {
        info!(path = ?db.path(), "Opening application state");

        let notifier = Notifier::new();
        let session = SessionStore::open(
            db,
            Arc::new(Roster::seeded()),
            notifier.clone(),
            config.auth_delay,
        );
        let chat = ConversationStore::new(&config, notifier.clone());
        let follower = chat.follow(&session);
        let directory = Mutex::new(UserDirectory::seeded(notifier.clone()));

        Self {
            config,
            notifier,
            session,
            chat,
            directory,
            follower,
        }
    }

    pub fn directory(&self) -> MutexGuard<'_, UserDirectory> {
        self.directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.follower.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use swiftdash_shared::{ConversationId, Role};

    use super::*;
    use crate::conversations::ChatPhase;
    use crate::directory::UserQuery;

    fn state() -> AppState {
        AppState::with_database(
            ClientConfig::instant(),
            Database::open_in_memory().unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_activates_chat() {
        let app = state();
        assert_eq!(app.chat.phase(), ChatPhase::Inactive);

        app.session
            .login("admin@example.com", "password")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(app.chat.phase(), ChatPhase::Idle);
        assert!(app.session.has_permission(Role::Admin));

        app.chat
            .set_active_conversation(Some(&ConversationId::new("chat2")))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(app.chat.phase(), ChatPhase::Ready);

        app.session.logout().unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(app.chat.phase(), ChatPhase::Inactive);
        assert!(app.chat.conversations().is_empty());
    }

    #[tokio::test]
    async fn test_open_at_path_restores_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            db_path: Some(dir.path().join("swiftdash.db")),
            ..ClientConfig::instant()
        };

        {
            let app = AppState::open(config.clone()).unwrap();
            app.session
                .login("user@example.com", "password")
                .await
                .unwrap();
        }

        let app = AppState::open(config).unwrap();
        let identity = app.session.current_identity().unwrap();
        assert_eq!(identity.email, "user@example.com");
        assert_eq!(app.chat.phase(), ChatPhase::Idle);
    }

    #[tokio::test]
    async fn test_directory_is_shared() {
        let app = state();
        let mut rx = app.notifier.subscribe();

        let id = app.directory().all()[3].id.clone();
        app.directory()
            .set_status(&id, swiftdash_shared::UserStatus::Active)
            .unwrap();

        let active = UserQuery {
            status: Some(swiftdash_shared::UserStatus::Active),
            ..UserQuery::default()
        };
        assert_eq!(app.directory().filter(&active).len(), 6);
        assert_eq!(
            rx.try_recv().unwrap().message,
            "User status has been updated"
        );
    }
}
