use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{AVATAR_BASE_URL, GENERATED_ID_LEN};
use crate::types::{Role, UserId, UserStatus};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// An authenticated actor record.
///
/// Serialized with camelCase keys; this is the exact shape written to the
/// durable session slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<NaiveDateTime>,
}

impl Identity {
    /// A fresh `user`-role identity with a generated id and an avatar seeded
    /// from the email address.
    pub fn new_member(name: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: generate_user_id(),
            name: name.into(),
            avatar: Some(avatar_url(&email)),
            email,
            role: Role::User,
            status: None,
            last_active: None,
        }
    }

    /// Case-insensitive email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

pub fn avatar_url(seed: &str) -> String {
    format!("{AVATAR_BASE_URL}{seed}")
}

/// Short lowercase base-36 identifier.
pub fn generate_user_id() -> UserId {
    let mut rng = rand::thread_rng();
    let id: String = (0..GENERATED_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    UserId(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let id = generate_user_id();
        assert_eq!(id.0.len(), GENERATED_ID_LEN);
        assert!(id
            .0
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_new_member_defaults() {
        let member = Identity::new_member("Dana", "dana@example.com");
        assert_eq!(member.role, Role::User);
        assert_eq!(
            member.avatar.as_deref(),
            Some("https://api.dicebear.com/7.x/avataaars/svg?seed=dana@example.com")
        );
        assert!(member.status.is_none());
    }

    #[test]
    fn test_email_match_ignores_case() {
        let member = Identity::new_member("Dana", "Dana@Example.com");
        assert!(member.has_email("dana@example.COM"));
        assert!(!member.has_email("dan@example.com"));
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let mut member = Identity::new_member("Dana", "dana@example.com");
        member.last_active =
            NaiveDateTime::parse_from_str("2025-04-24T08:30:00", "%Y-%m-%dT%H:%M:%S").ok();
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["lastActive"], "2025-04-24T08:30:00");
        assert!(json.get("status").is_none());

        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back, member);
    }
}
