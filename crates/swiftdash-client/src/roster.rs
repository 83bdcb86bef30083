//! Known identities used for login and duplicate-email checks.
//!
//! Seeded at construction, grown only by registration, never persisted:
//! a new process starts from the seed again.

use std::sync::{PoisonError, RwLock};

use swiftdash_shared::identity::avatar_url;
use swiftdash_shared::{Identity, Role, UserId};

#[derive(Debug)]
pub struct Roster {
    members: RwLock<Vec<Identity>>,
}

impl Roster {
    pub fn new(members: Vec<Identity>) -> Self {
        Self {
            members: RwLock::new(members),
        }
    }

    /// The two built-in accounts.
    pub fn seeded() -> Self {
        Self::new(seed_members())
    }

    pub fn find_by_email(&self, email: &str) -> Option<Identity> {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        members.iter().find(|m| m.has_email(email)).cloned()
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.find_by_email(email).is_some()
    }

    /// Append `identity` unless its email is already taken. The check and the
    /// append happen under one write lock.
    pub fn insert_if_absent(&self, identity: Identity) -> bool {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        if members.iter().any(|m| m.has_email(&identity.email)) {
            return false;
        }
        members.push(identity);
        true
    }

    /// Drop a member again, used to roll back a registration that could
    /// not be completed.
    pub fn remove(&self, id: &UserId) -> bool {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let before = members.len();
        members.retain(|m| &m.id != id);
        members.len() != before
    }

    pub fn len(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::seeded()
    }
}

fn seed_members() -> Vec<Identity> {
    vec![
        Identity {
            id: UserId::new("1"),
            name: "Admin User".into(),
            email: "admin@example.com".into(),
            role: Role::Admin,
            avatar: Some(avatar_url("admin")),
            status: None,
            last_active: None,
        },
        Identity {
            id: UserId::new("2"),
            name: "Regular User".into(),
            email: "user@example.com".into(),
            role: Role::User,
            avatar: Some(avatar_url("user")),
            status: None,
            last_active: None,
        },
    ]
}
