//! # swiftdash-shared
//!
//! Domain model shared by the SwiftDash store, client and CLI crates:
//! identifiers, roles, identities, conversations and messages.

pub mod chat;
pub mod constants;
pub mod error;
pub mod identity;
pub mod types;

pub use chat::{Attachment, Conversation, Message};
pub use error::ModelError;
pub use identity::Identity;
pub use types::{
    AttachmentKind, ConversationId, ConversationKind, MessageId, Role, UserId, UserStatus,
};
