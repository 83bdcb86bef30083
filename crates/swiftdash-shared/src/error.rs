use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown role '{0}' (expected admin, user or guest)")]
    UnknownRole(String),

    #[error("Unknown user status '{0}' (expected active, inactive or suspended)")]
    UnknownStatus(String),

    #[error("Unknown conversation kind '{0}' (expected private or group)")]
    UnknownConversationKind(String),
}
