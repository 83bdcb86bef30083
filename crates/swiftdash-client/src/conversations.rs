//! Conversation Store: conversation list, active selection and the message
//! log of the active conversation.
//!
//! ```text
//! Inactive --identity--> Idle --select--> Loading --load delay--> Ready
//!    ^                    ^  <--deselect--   |                      |
//!    +---- identity cleared (from any) ------+------ select --------+
//! ```
//!
//! Every transition bumps the epoch. Delayed work (log loads, auto-replies)
//! is scheduled under the epoch current at scheduling time and is dropped if
//! the epoch has moved on when it fires.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use swiftdash_shared::constants::AUTO_REPLY_TEXT;
use swiftdash_shared::{
    Attachment, Conversation, ConversationId, Identity, Message, MessageId, UserId,
};

use crate::config::ClientConfig;
use crate::error::ChatError;
use crate::events::Notifier;
use crate::fixtures;
use crate::scheduler::Scheduler;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    /// No identity.
    #[default]
    Inactive,
    /// Conversation list loaded, nothing selected.
    Idle,
    /// A conversation is selected and its log is being fetched.
    Loading,
    /// The log of the selected conversation is populated.
    Ready,
}

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub phase: ChatPhase,
    /// The identity messages are sent as.
    pub viewer: Option<Identity>,
    pub conversations: Vec<Conversation>,
    pub active: Option<ConversationId>,
    /// Log of the active conversation; empty unless `phase` is `Ready`
    /// (or `Loading` with sends issued during the load).
    pub messages: Vec<Message>,
    histories: HashMap<ConversationId, Vec<Message>>,
    epoch: u64,
}

impl ChatState {
    pub fn conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active.as_ref().and_then(|id| self.conversation(id))
    }

    pub fn is_loading_messages(&self) -> bool {
        self.phase == ChatPhase::Loading
    }

    /// Append to the conversation's history, its `last_message`, and the
    /// visible log when it is the active one.
    fn append(&mut self, message: Message) {
        let id = message.conversation_id.clone();
        if self.active.as_ref() == Some(&id) {
            self.messages.push(message.clone());
        }
        self.histories
            .entry(id.clone())
            .or_default()
            .push(message.clone());
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            conversation.last_message = Some(message);
        }
    }

    fn mark_read(&mut self, id: &ConversationId) -> bool {
        match self.conversations.iter_mut().find(|c| &c.id == id) {
            Some(conversation) if conversation.unread_count != 0 => {
                conversation.unread_count = 0;
                true
            }
            _ => false,
        }
    }
}

struct Inner {
    state: watch::Sender<ChatState>,
    scheduler: Scheduler,
    notifier: Notifier,
    config: ClientConfig,
}

#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Inner>,
}

impl ConversationStore {
    pub fn new(config: &ClientConfig, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self {
            inner: Arc::new(Inner {
                state,
                scheduler: Scheduler::new(),
                notifier,
                config: config.clone().normalised(),
            }),
        }
    }

    /// Track the session: activate on sign-in, tear down on sign-out.
    ///
    /// The current identity is applied before this returns; later changes
    /// are applied by the spawned task, which ends with the session or the
    /// store.
    pub fn follow(&self, session: &SessionStore) -> JoinHandle<()> {
        let mut rx = session.subscribe();
        let (mut generation, initial) = {
            let s = rx.borrow_and_update();
            (s.epoch, s.identity.clone())
        };
        self.inner.sync_identity(initial);

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let (epoch, identity) = {
                    let s = rx.borrow_and_update();
                    (s.epoch, s.identity.clone())
                };
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                // A sign-out may be hidden behind a sign-in that followed it
                // before this task woke; the session epoch still records it.
                if epoch != generation {
                    generation = epoch;
                    inner.sync_identity(None);
                }
                inner.sync_identity(identity);
            }
        })
    }

    pub fn sync_identity(&self, identity: Option<Identity>) {
        self.inner.sync_identity(identity);
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ChatState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> ChatPhase {
        self.inner.state.borrow().phase
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.inner.state.borrow().conversations.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.state.borrow().messages.clone()
    }

    pub fn active_conversation(&self) -> Option<Conversation> {
        self.inner.state.borrow().active_conversation().cloned()
    }

    /// Select a conversation (or none). Selecting starts a fresh load of its
    /// log even when it was already selected.
    pub fn set_active_conversation(&self, id: Option<&ConversationId>) -> Result<(), ChatError> {
        let mut outcome = Err(ChatError::SignedOut);
        let mut epoch = 0;

        self.inner.state.send_if_modified(|s| {
            if s.phase == ChatPhase::Inactive {
                return false;
            }
            if let Some(id) = id {
                if s.conversation(id).is_none() {
                    outcome = Err(ChatError::UnknownConversation(id.clone()));
                    return false;
                }
            }

            s.epoch += 1;
            s.active = id.cloned();
            s.messages.clear();
            s.phase = if id.is_some() {
                ChatPhase::Loading
            } else {
                ChatPhase::Idle
            };
            epoch = s.epoch;
            outcome = Ok(());
            true
        });

        outcome?;
        self.inner.scheduler.cancel_before(epoch);

        match id {
            Some(id) => {
                debug!(conversation = %id, "Loading message log");
                let weak = Arc::downgrade(&self.inner);
                let id = id.clone();
                self.inner
                    .scheduler
                    .schedule(epoch, self.inner.config.message_load_delay, async move {
                        if let Some(inner) = weak.upgrade() {
                            inner.complete_load(epoch, &id);
                        }
                    });
            }
            None => debug!("Conversation deselected"),
        }
        Ok(())
    }

    /// Append a message from the current identity to the active
    /// conversation. Returns `None` (and changes nothing) when signed out or
    /// nothing is selected.
    pub fn send_message(&self, content: &str, attachments: Vec<Attachment>) -> Option<Message> {
        let mut sent = None;
        let mut epoch = 0;

        self.inner.state.send_if_modified(|s| {
            let (Some(viewer), Some(active)) = (s.viewer.as_ref(), s.active.as_ref()) else {
                return false;
            };
            let message = Message::authored_by(
                new_message_id(active, "msg"),
                viewer,
                active.clone(),
                content,
                Utc::now(),
            )
            .with_attachments(attachments);

            s.append(message.clone());
            epoch = s.epoch;
            sent = Some(message);
            true
        });

        let Some(message) = sent else {
            warn!("Send ignored, no active conversation");
            return None;
        };
        info!(
            conversation = %message.conversation_id,
            message = %message.id,
            attachments = message.attachments.len(),
            "Message sent"
        );

        self.inner
            .maybe_schedule_reply(epoch, &message.conversation_id, &message.sender_id);
        Some(message)
    }

    /// Reset the unread counter. Returns whether it changed.
    pub fn mark_conversation_as_read(&self, id: &ConversationId) -> bool {
        self.inner.state.send_if_modified(|s| s.mark_read(id))
    }

    /// Delayed tasks not yet run.
    pub fn pending_tasks(&self) -> usize {
        self.inner.scheduler.pending()
    }
}

impl Inner {
    fn sync_identity(&self, identity: Option<Identity>) {
        let mut new_epoch = None;

        self.state.send_if_modified(|s| match identity {
            None => {
                if s.phase == ChatPhase::Inactive {
                    return false;
                }
                let epoch = s.epoch + 1;
                *s = ChatState {
                    epoch,
                    ..ChatState::default()
                };
                new_epoch = Some(epoch);
                info!("Conversations torn down");
                true
            }
            Some(identity) => {
                if s.viewer.as_ref().is_some_and(|v| v.id == identity.id) {
                    return false;
                }
                let (conversations, histories) =
                    fixtures::seed_backend(&mut rand::thread_rng(), Utc::now());
                let epoch = s.epoch + 1;
                info!(
                    user = %identity.id,
                    conversations = conversations.len(),
                    "Conversations loaded"
                );
                *s = ChatState {
                    phase: ChatPhase::Idle,
                    viewer: Some(identity),
                    conversations,
                    active: None,
                    messages: Vec::new(),
                    histories,
                    epoch,
                };
                new_epoch = Some(epoch);
                true
            }
        });

        if let Some(epoch) = new_epoch {
            self.scheduler.cancel_before(epoch);
        }
    }

    fn complete_load(&self, epoch: u64, id: &ConversationId) {
        let applied = self.state.send_if_modified(|s| {
            if s.epoch != epoch {
                return false;
            }
            s.messages = s.histories.get(id).cloned().unwrap_or_default();
            s.phase = ChatPhase::Ready;
            s.mark_read(id);
            true
        });

        if applied {
            debug!(conversation = %id, "Message log loaded");
        } else {
            debug!(conversation = %id, "Dropped stale message load");
        }
    }

    fn maybe_schedule_reply(
        self: &Arc<Self>,
        epoch: u64,
        conversation: &ConversationId,
        sender: &UserId,
    ) {
        let delay = {
            let mut rng = rand::thread_rng();
            if rng.gen::<f64>() >= self.config.reply_probability {
                return;
            }
            let (min, max) = (self.config.reply_delay_min, self.config.reply_delay_max);
            if max > min {
                rng.gen_range(min..=max)
            } else {
                min
            }
        };

        debug!(conversation = %conversation, ?delay, "Auto-reply scheduled");
        let weak = Arc::downgrade(self);
        let conversation = conversation.clone();
        let sender = sender.clone();
        self.scheduler.schedule(epoch, delay, async move {
            if let Some(inner) = weak.upgrade() {
                inner.deliver_reply(epoch, &conversation, &sender);
            }
        });
    }

    fn deliver_reply(&self, epoch: u64, conversation: &ConversationId, sender: &UserId) {
        let mut responder_name = None;

        self.state.send_if_modified(|s| {
            if s.epoch != epoch {
                return false;
            }
            let Some(responder) = s
                .conversation(conversation)
                .and_then(|c| c.responder_for(sender))
                .cloned()
            else {
                return false;
            };

            let reply = Message::authored_by(
                new_message_id(conversation, "reply"),
                &responder,
                conversation.clone(),
                AUTO_REPLY_TEXT,
                Utc::now(),
            )
            .read();
            s.append(reply);
            responder_name = Some(responder.name);
            true
        });

        match responder_name {
            Some(name) => {
                info!(conversation = %conversation, from = %name, "Auto-reply delivered");
                self.notifier.info(format!("New message from {name}"));
            }
            None => debug!(conversation = %conversation, "Dropped stale auto-reply"),
        }
    }
}

fn new_message_id(conversation: &ConversationId, kind: &str) -> MessageId {
    MessageId::new(format!("{conversation}-{kind}-{}", Uuid::new_v4().simple()))
}
