//! Seed conversations and message histories.
//!
//! These stand in for a messaging backend: the Conversation Store copies them
//! when an identity becomes active and appends to the histories from then on.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use swiftdash_shared::identity::avatar_url;
use swiftdash_shared::{
    Attachment, AttachmentKind, Conversation, ConversationId, ConversationKind, Identity,
    Message, MessageId, Role, UserId,
};

fn participant(id: &str, name: &str, email: &str, role: Role, seed: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        name: name.into(),
        email: email.into(),
        role,
        avatar: Some(avatar_url(seed)),
        status: None,
        last_active: None,
    }
}

fn admin() -> Identity {
    participant("1", "Admin User", "admin@example.com", Role::Admin, "admin")
}

fn regular() -> Identity {
    participant("2", "Regular User", "user@example.com", Role::User, "user")
}

fn sarah() -> Identity {
    participant("3", "Sarah Johnson", "sarah@example.com", Role::User, "sarah")
}

fn michael() -> Identity {
    participant("4", "Michael Chen", "michael@example.com", Role::User, "michael")
}

/// The three seed conversations, without `last_message`.
pub fn seed_conversations() -> Vec<Conversation> {
    vec![
        Conversation {
            id: ConversationId::new("chat1"),
            display_name: "Marketing Team".into(),
            kind: ConversationKind::Group,
            participants: vec![admin(), regular(), sarah()],
            last_message: None,
            unread_count: 2,
        },
        Conversation {
            id: ConversationId::new("chat2"),
            display_name: "Sarah Johnson".into(),
            kind: ConversationKind::Private,
            participants: vec![admin(), sarah()],
            last_message: None,
            unread_count: 0,
        },
        Conversation {
            id: ConversationId::new("chat3"),
            display_name: "Project X Discussion".into(),
            kind: ConversationKind::Group,
            participants: vec![admin(), regular(), michael()],
            last_message: None,
            unread_count: 5,
        },
    ]
}

/// Five scripted messages for `conversation`, oldest first.
pub fn scripted_history(conversation: &ConversationId, now: DateTime<Utc>) -> Vec<Message> {
    let msg = |n: u32, sender: Identity, content: &str, hours_ago: i64, read: bool| {
        let m = Message::authored_by(
            MessageId::new(format!("{conversation}-msg{n}")),
            &sender,
            conversation.clone(),
            content,
            now - Duration::hours(hours_ago),
        );
        if read {
            m.read()
        } else {
            m
        }
    };

    vec![
        msg(1, admin(), "Hey team, how's the project coming along?", 48, true),
        msg(
            2,
            regular(),
            "We're making good progress! Just finalizing the last details.",
            47,
            true,
        ),
        msg(
            3,
            sarah(),
            "Great! I've attached the latest design mockups for review.",
            46,
            true,
        )
        .with_attachments(vec![Attachment::new(
            AttachmentKind::Image,
            "https://via.placeholder.com/400x300",
            "mockup-v3.jpg",
        )]),
        msg(
            4,
            admin(),
            "These look fantastic! Let's discuss them in our next meeting.",
            24,
            false,
        ),
        msg(
            5,
            regular(),
            "I've prepared the presentation slides for tomorrow.",
            2,
            false,
        )
        .with_attachments(vec![Attachment::new(
            AttachmentKind::File,
            "#",
            "presentation.pdf",
        )]),
    ]
}

/// Seed conversations with a 3-to-5 message history each and `last_message`
/// pointing at the newest entry.
pub fn seed_backend<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
) -> (Vec<Conversation>, HashMap<ConversationId, Vec<Message>>) {
    let mut conversations = seed_conversations();
    let mut histories = HashMap::with_capacity(conversations.len());

    for conversation in &mut conversations {
        let mut history = scripted_history(&conversation.id, now);
        history.truncate(rng.gen_range(3..=5));
        conversation.last_message = history.last().cloned();
        histories.insert(conversation.id.clone(), history);
    }

    (conversations, histories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_conversations() {
        let conversations = seed_conversations();
        let names: Vec<_> = conversations.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(
            names,
            ["Marketing Team", "Sarah Johnson", "Project X Discussion"]
        );
        let unread: Vec<_> = conversations.iter().map(|c| c.unread_count).collect();
        assert_eq!(unread, [2, 0, 5]);
    }

    #[test]
    fn test_history_is_chronological() {
        let history = scripted_history(&ConversationId::new("chat1"), Utc::now());
        assert_eq!(history.len(), 5);
        assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(history[0].id, MessageId::new("chat1-msg1"));
        assert_eq!(history[2].attachments[0].kind, AttachmentKind::Image);
    }

    #[test]
    fn test_backend_last_message_matches_history() {
        let (conversations, histories) = seed_backend(&mut rand::thread_rng(), Utc::now());
        for conversation in conversations {
            let history = &histories[&conversation.id];
            assert!((3..=5).contains(&history.len()));
            assert_eq!(conversation.last_message.as_ref(), history.last());
        }
    }
}
