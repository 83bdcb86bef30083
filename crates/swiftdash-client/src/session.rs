//! Session Store: the current identity, its lifecycle, and role checks.
//!
//! State lives in a `watch` channel so views can subscribe; every mutation
//! replaces the value under the channel lock. The signed-in identity is
//! mirrored to the durable slot [`SESSION_SLOT_KEY`].
//!
//! `logout` advances an epoch. A login or registration whose simulated delay
//! straddles a logout applies nothing and fails with
//! [`SessionError::Superseded`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use swiftdash_shared::constants::{DEMO_PASSWORD, SESSION_SLOT_KEY};
use swiftdash_shared::{Identity, Role};
use swiftdash_store::{Database, StoreError};

use crate::error::SessionError;
use crate::events::Notifier;
use crate::roster::Roster;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True while a login or registration is waiting out its delay.
    pub is_loading: bool,
    pub(crate) epoch: u64,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    /// False when signed out; otherwise the role order decides.
    pub fn has_permission(&self, required: Role) -> bool {
        self.role().is_some_and(|role| role.grants(required))
    }
}

struct Inner {
    roster: Arc<Roster>,
    db: Mutex<Database>,
    notifier: Notifier,
    auth_delay: Duration,
    state: watch::Sender<SessionState>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Build the store and restore any identity left in the durable slot.
    ///
    /// A slot that cannot be decoded is discarded and the session starts
    /// signed out.
    pub fn open(
        db: Database,
        roster: Arc<Roster>,
        notifier: Notifier,
        auth_delay: Duration,
    ) -> Self {
        let identity = restore_identity(&db);
        match &identity {
            Some(id) => info!(user = %id.id, email = %id.email, "Restored session"),
            None => debug!("No stored session"),
        }

        let (state, _) = watch::channel(SessionState {
            identity,
            is_loading: false,
            epoch: 0,
        });

        Self {
            inner: Arc::new(Inner {
                roster,
                db: Mutex::new(db),
                notifier,
                auth_delay,
                state,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn has_permission(&self, required: Role) -> bool {
        self.inner.state.borrow().has_permission(required)
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.inner.roster
    }

    /// Sign in against the roster. Every roster account shares the demo
    /// credential; the email match ignores case.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let epoch = self.begin_request();
        tokio::time::sleep(self.inner.auth_delay).await;

        let result = match self.inner.roster.find_by_email(email) {
            Some(found) if password == DEMO_PASSWORD => self.establish(epoch, found),
            _ => Err(SessionError::InvalidCredentials),
        };
        self.end_request();

        match &result {
            Ok(identity) => {
                info!(user = %identity.id, email = %identity.email, "Login succeeded");
                self.inner
                    .notifier
                    .success(format!("Welcome back, {}!", identity.name));
            }
            Err(e) => {
                warn!(email, error = %e, "Login failed");
                self.inner.notifier.error(e.to_string());
            }
        }
        result
    }

    /// Create a `user`-role account and sign it in. The password is accepted
    /// but not stored; every account authenticates with the demo credential.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<Identity, SessionError> {
        let epoch = self.begin_request();
        tokio::time::sleep(self.inner.auth_delay).await;

        let result = self.complete_registration(epoch, name, email);
        self.end_request();

        match &result {
            Ok(identity) => {
                info!(user = %identity.id, email = %identity.email, "Registered new account");
                self.inner
                    .notifier
                    .success(format!("Welcome, {}!", identity.name));
            }
            Err(e) => {
                warn!(email, error = %e, "Registration failed");
                self.inner.notifier.error(e.to_string());
            }
        }
        result
    }

    /// Clear the current identity and the durable slot.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.db().remove_slot(SESSION_SLOT_KEY)?;

        self.inner.state.send_modify(|s| {
            s.epoch += 1;
            s.identity = None;
            s.is_loading = false;
        });

        info!("Logged out");
        self.inner.notifier.info("You've been logged out");
        Ok(())
    }

    fn complete_registration(
        &self,
        epoch: u64,
        name: &str,
        email: &str,
    ) -> Result<Identity, SessionError> {
        if self.inner.state.borrow().epoch != epoch {
            return Err(SessionError::Superseded);
        }

        let identity = Identity::new_member(name.trim(), email.trim());
        if !self.inner.roster.insert_if_absent(identity.clone()) {
            return Err(SessionError::EmailTaken);
        }

        let id = identity.id.clone();
        self.establish(epoch, identity).map_err(|e| {
            self.inner.roster.remove(&id);
            e
        })
    }

    /// Persist `identity`, then make it current. Nothing is applied if the
    /// epoch moved on or the slot write fails.
    fn establish(&self, epoch: u64, identity: Identity) -> Result<Identity, SessionError> {
        if self.inner.state.borrow().epoch != epoch {
            return Err(SessionError::Superseded);
        }

        {
            let db = self.db();
            db.write_slot_json(SESSION_SLOT_KEY, &identity)?;
        }

        let mut applied = false;
        self.inner.state.send_if_modified(|s| {
            if s.epoch != epoch {
                return false;
            }
            s.identity = Some(identity.clone());
            applied = true;
            true
        });

        if !applied {
            if let Err(e) = self.db().remove_slot(SESSION_SLOT_KEY) {
                error!(error = %e, "Failed to clear slot after superseded sign-in");
            }
            return Err(SessionError::Superseded);
        }
        Ok(identity)
    }

    fn begin_request(&self) -> u64 {
        let mut epoch = 0;
        self.inner.state.send_modify(|s| {
            s.is_loading = true;
            epoch = s.epoch;
        });
        epoch
    }

    fn end_request(&self) {
        self.inner.state.send_if_modified(|s| {
            let was_loading = s.is_loading;
            s.is_loading = false;
            was_loading
        });
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.inner.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn restore_identity(db: &Database) -> Option<Identity> {
    match db.read_slot_json::<Identity>(SESSION_SLOT_KEY) {
        Ok(identity) => identity,
        Err(StoreError::Json(e)) => {
            error!(error = %e, "Failed to parse stored session, discarding it");
            if let Err(e) = db.remove_slot(SESSION_SLOT_KEY) {
                error!(error = %e, "Failed to clear corrupt session slot");
            }
            None
        }
        Err(e) => {
            error!(error = %e, "Failed to read stored session");
            None
        }
    }
}

/// Field messages for the sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFormErrors {
    pub email: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl LoginFormErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Check the sign-in form before calling [`SessionStore::login`].
pub fn validate_login_form(email: &str, password: &str) -> Result<(), LoginFormErrors> {
    let mut errors = LoginFormErrors::default();

    if email.is_empty() {
        errors.email = Some("Email is required");
    } else if !looks_like_email(email) {
        errors.email = Some("Email is invalid");
    }

    if password.is_empty() {
        errors.password = Some("Password is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Some whitespace-free run shaped `a@b.c`.
fn looks_like_email(input: &str) -> bool {
    input.split_whitespace().any(|token| {
        token.match_indices('@').any(|(at, _)| {
            let domain = &token[at + 1..];
            at > 0
                && domain
                    .match_indices('.')
                    .any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
        })
    })
}
