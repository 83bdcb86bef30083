//! Admin user table: an in-memory list with search, filters and edits.
//!
//! Page-local state. Nothing here touches the roster used for sign-in.

use chrono::{NaiveDateTime, Utc};
use tracing::info;

use swiftdash_shared::identity::{avatar_url, generate_user_id};
use swiftdash_shared::{Identity, Role, UserId, UserStatus};

use crate::error::DirectoryError;
use crate::events::Notifier;

/// Search and filter criteria. All parts must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Case-insensitive substring of name or email; empty matches all.
    pub search: String,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserQuery {
    pub fn matches(&self, user: &Identity) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = user.name.to_lowercase().contains(&needle)
            || user.email.to_lowercase().contains(&needle);
        let matches_role = self.role.map_or(true, |r| user.role == r);
        let matches_status = self.status.map_or(true, |s| user.status == Some(s));
        matches_search && matches_role && matches_status
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
}

pub struct UserDirectory {
    users: Vec<Identity>,
    notifier: Notifier,
}

impl UserDirectory {
    pub fn new(users: Vec<Identity>, notifier: Notifier) -> Self {
        Self { users, notifier }
    }

    pub fn seeded(notifier: Notifier) -> Self {
        Self::new(seed_users(), notifier)
    }

    pub fn all(&self) -> &[Identity] {
        &self.users
    }

    pub fn get(&self, id: &UserId) -> Option<&Identity> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Matching users in table order.
    pub fn filter(&self, query: &UserQuery) -> Vec<&Identity> {
        self.users.iter().filter(|u| query.matches(u)).collect()
    }

    pub fn add(&mut self, new_user: NewUser) -> Result<Identity, DirectoryError> {
        if self.users.iter().any(|u| u.has_email(&new_user.email)) {
            return Err(DirectoryError::EmailTaken);
        }

        let user = Identity {
            id: generate_user_id(),
            avatar: Some(avatar_url(&new_user.email)),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            status: Some(new_user.status),
            last_active: Some(Utc::now().naive_utc()),
        };
        self.users.push(user.clone());

        info!(user = %user.id, email = %user.email, role = %user.role, "User added");
        self.notifier
            .success(format!("User {} has been added", user.name));
        Ok(user)
    }

    /// Replace the stored record with the same id. The email must not
    /// belong to any other record.
    pub fn update(&mut self, user: Identity) -> Result<(), DirectoryError> {
        if self
            .users
            .iter()
            .any(|u| u.id != user.id && u.has_email(&user.email))
        {
            return Err(DirectoryError::EmailTaken);
        }

        let slot = self
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| DirectoryError::UnknownUser(user.id.clone()))?;

        info!(user = %user.id, "User updated");
        self.notifier
            .success(format!("User {} has been updated", user.name));
        *slot = user;
        Ok(())
    }

    pub fn set_status(&mut self, id: &UserId, status: UserStatus) -> Result<(), DirectoryError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| DirectoryError::UnknownUser(id.clone()))?;
        user.status = Some(status);

        info!(user = %id, %status, "User status changed");
        self.notifier.success("User status has been updated");
        Ok(())
    }
}

type SeedRow = (&'static str, &'static str, &'static str, Role, UserStatus, &'static str);

const SEED: [SeedRow; 7] = [
    ("1", "Admin User", "admin", Role::Admin, UserStatus::Active, "2025-04-24T08:30:00"),
    ("2", "Regular User", "user", Role::User, UserStatus::Active, "2025-04-23T14:45:00"),
    ("3", "Sarah Johnson", "sarah", Role::User, UserStatus::Active, "2025-04-23T10:22:00"),
    ("4", "Michael Chen", "michael", Role::User, UserStatus::Inactive, "2025-04-18T16:50:00"),
    ("5", "Emma Garcia", "emma", Role::User, UserStatus::Active, "2025-04-24T09:15:00"),
    ("6", "Alex Wong", "alex", Role::User, UserStatus::Suspended, "2025-04-10T11:30:00"),
    ("7", "David Kim", "david", Role::User, UserStatus::Active, "2025-04-22T13:45:00"),
];

fn seed_users() -> Vec<Identity> {
    SEED.iter()
        .map(|&(id, name, seed, role, status, last)| Identity {
            id: UserId::new(id),
            name: name.into(),
            email: format!("{seed}@example.com"),
            role,
            avatar: Some(avatar_url(seed)),
            status: Some(status),
            last_active: NaiveDateTime::parse_from_str(last, "%Y-%m-%dT%H:%M:%S").ok(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NotificationLevel;

    fn directory() -> UserDirectory {
        UserDirectory::seeded(Notifier::new())
    }

    fn names(users: Vec<&Identity>) -> Vec<&str> {
        users.into_iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_seed() {
        let dir = directory();
        assert_eq!(dir.all().len(), 7);
        assert!(dir.all().iter().all(|u| u.last_active.is_some()));
    }

    #[test]
    fn test_empty_query_matches_all_in_order() {
        let dir = directory();
        let all = dir.filter(&UserQuery::default());
        assert_eq!(all.len(), 7);
        assert_eq!(all[0].name, "Admin User");
        assert_eq!(all[6].name, "David Kim");
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_email() {
        let dir = directory();
        let query = UserQuery {
            search: "SARAH".into(),
            ..UserQuery::default()
        };
        assert_eq!(names(dir.filter(&query)), ["Sarah Johnson"]);

        let query = UserQuery {
            search: "Emma@".into(),
            ..UserQuery::default()
        };
        assert_eq!(names(dir.filter(&query)), ["Emma Garcia"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let dir = directory();
        let query = UserQuery {
            search: "example.com".into(),
            role: Some(Role::User),
            status: Some(UserStatus::Active),
        };
        assert_eq!(
            names(dir.filter(&query)),
            ["Regular User", "Sarah Johnson", "Emma Garcia", "David Kim"]
        );

        let query = UserQuery {
            role: Some(Role::Admin),
            status: Some(UserStatus::Suspended),
            ..UserQuery::default()
        };
        assert!(dir.filter(&query).is_empty());
    }

    #[test]
    fn test_add_user() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        let mut dir = UserDirectory::seeded(notifier);

        let added = dir
            .add(NewUser {
                name: "Fox Mulder".into(),
                email: "fox@example.com".into(),
                role: Role::Guest,
                status: UserStatus::Inactive,
            })
            .unwrap();

        assert_eq!(dir.all().len(), 8);
        assert_eq!(dir.get(&added.id), Some(&added));
        assert_eq!(added.status, Some(UserStatus::Inactive));
        assert!(added.last_active.is_some());
        let note = rx.try_recv().unwrap();
        assert_eq!(note.level, NotificationLevel::Success);
        assert_eq!(note.message, "User Fox Mulder has been added");
    }

    #[test]
    fn test_add_rejects_duplicate_email() {
        let mut dir = directory();
        let result = dir.add(NewUser {
            name: "Copy".into(),
            email: "ALEX@example.com".into(),
            role: Role::User,
            status: UserStatus::Active,
        });
        assert_eq!(result, Err(DirectoryError::EmailTaken));
        assert_eq!(dir.all().len(), 7);
    }

    #[test]
    fn test_update_replaces_record() {
        let mut dir = directory();
        let mut edited = dir.get(&UserId::new("4")).cloned().unwrap();
        edited.role = Role::Admin;
        edited.name = "Michael C.".into();

        dir.update(edited.clone()).unwrap();
        assert_eq!(dir.get(&UserId::new("4")), Some(&edited));
    }

    #[test]
    fn test_update_rejects_email_of_another_user() {
        let mut dir = directory();
        let mut edited = dir.get(&UserId::new("5")).cloned().unwrap();
        edited.email = "Sarah@Example.com".into();

        assert_eq!(dir.update(edited), Err(DirectoryError::EmailTaken));
        assert_eq!(
            dir.get(&UserId::new("5")).map(|u| u.email.as_str()),
            Some("emma@example.com")
        );

        let mut same = dir.get(&UserId::new("5")).cloned().unwrap();
        same.email = "EMMA@example.com".into();
        dir.update(same).unwrap();
    }

    #[test]
    fn test_update_unknown_user() {
        let mut dir = directory();
        let stranger = Identity::new_member("Nobody", "nobody@example.com");
        let id = stranger.id.clone();
        assert_eq!(dir.update(stranger), Err(DirectoryError::UnknownUser(id)));
    }

    #[test]
    fn test_set_status() {
        let mut dir = directory();
        let alex = UserId::new("6");
        dir.set_status(&alex, UserStatus::Active).unwrap();
        assert_eq!(dir.get(&alex).unwrap().status, Some(UserStatus::Active));

        let ghost = UserId::new("99");
        assert_eq!(
            dir.set_status(&ghost, UserStatus::Active),
            Err(DirectoryError::UnknownUser(ghost))
        );
    }
}
