use swiftdash_shared::{ConversationId, UserId};
use swiftdash_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Unknown email and wrong password are deliberately the same failure.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Session changed while the request was pending")]
    Superseded,

    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("No user is signed in")]
    SignedOut,

    #[error("Unknown conversation: {0}")]
    UnknownConversation(ConversationId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Email already exists")]
    EmailTaken,
}
