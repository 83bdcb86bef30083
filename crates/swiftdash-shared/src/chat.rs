//! Conversation and message records.
//!
//! Messages are immutable once created. A conversation carries a snapshot
//! of its participants and the most recent message appended to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::types::{AttachmentKind, ConversationId, ConversationKind, MessageId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
}

impl Attachment {
    pub fn new(kind: AttachmentKind, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender_id: UserId,
    pub sender_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
    pub conversation_id: ConversationId,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Build a message authored by `sender`, copying its display fields.
    pub fn authored_by(
        id: MessageId,
        sender: &Identity,
        conversation_id: ConversationId,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            sender_id: sender.id.clone(),
            sender_name: sender.name.clone(),
            sender_avatar: sender.avatar.clone(),
            conversation_id,
            timestamp,
            is_read: false,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn read(mut self) -> Self {
        self.is_read = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub display_name: String,
    pub kind: ConversationKind,
    pub participants: Vec<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    pub unread_count: u32,
}

impl Conversation {
    /// The participant who answers on behalf of the conversation: the first
    /// one that is not `sender`, else the first participant.
    pub fn responder_for(&self, sender: &UserId) -> Option<&Identity> {
        self.participants
            .iter()
            .find(|p| &p.id != sender)
            .or_else(|| self.participants.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn person(id: &str, name: &str) -> Identity {
        Identity {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("{id}@example.com"),
            role: Role::User,
            avatar: None,
            status: None,
            last_active: None,
        }
    }

    fn conversation(participants: Vec<Identity>) -> Conversation {
        Conversation {
            id: ConversationId::new("c"),
            display_name: "c".into(),
            kind: ConversationKind::Group,
            participants,
            last_message: None,
            unread_count: 0,
        }
    }

    #[test]
    fn test_responder_skips_sender() {
        let conv = conversation(vec![person("1", "A"), person("3", "Sarah")]);
        let responder = conv.responder_for(&UserId::new("1")).unwrap();
        assert_eq!(responder.name, "Sarah");
    }

    #[test]
    fn test_responder_falls_back_to_first() {
        let conv = conversation(vec![person("1", "A")]);
        let responder = conv.responder_for(&UserId::new("1")).unwrap();
        assert_eq!(responder.name, "A");
    }

    #[test]
    fn test_responder_none_without_participants() {
        let conv = conversation(Vec::new());
        assert!(conv.responder_for(&UserId::new("1")).is_none());
    }

    #[test]
    fn test_attachment_kind_serialized_as_type() {
        let a = Attachment::new(AttachmentKind::File, "#", "presentation.pdf");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "file");
    }
}
