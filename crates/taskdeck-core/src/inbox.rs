use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::Clock;

pub const CURRENT_USER: &str = "You";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: u64,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub sender: String,
    pub content: String,
    /// Wall-clock label shown on the bubble, `HH:MM`.
    pub time: String,
    pub is_current_user: bool,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chat {
    pub id: u64,
    pub title: String,
    pub name: String,
    /// Preview line: the latest content sent from this client, or the opener.
    pub content: String,
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
}

impl Chat {
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|message| message.timestamp)
    }

    pub fn unread_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| !message.read && !message.is_current_user)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message: Message,
    pub chat: Chat,
}

/// In-memory chat threads backing the inbox panel.
pub struct InboxStore {
    chats: Mutex<Vec<Chat>>,
    clock: Clock,
    timezone: Tz,
}

impl Default for InboxStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for InboxStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboxStore")
            .field("chats", &self.chats.lock().len())
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

impl InboxStore {
    pub fn new(chats: Vec<Chat>) -> Self {
        Self::with_clock(chats, Arc::new(Utc::now), chrono_tz::UTC)
    }

    pub fn with_clock(chats: Vec<Chat>, clock: Clock, timezone: Tz) -> Self {
        info!(count = chats.len(), timezone = %timezone, "inbox store ready");
        Self {
            chats: Mutex::new(chats),
            clock,
            timezone,
        }
    }

    /// Chats ordered by their most recent message, newest first.
    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Vec<Chat> {
        let mut chats = self.chats.lock().clone();
        chats.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        debug!(count = chats.len(), "listed chats");
        chats
    }

    #[tracing::instrument(skip(self, content), fields(chat_id = ?chat_id))]
    pub fn send(
        &self,
        chat_id: Option<u64>,
        content: Option<String>,
    ) -> Result<SentMessage, StoreError> {
        let (chat_id, content) = match (chat_id, content) {
            (Some(id), Some(text)) if id != 0 && !text.trim().is_empty() => (id, text),
            _ => {
                return Err(StoreError::validation(
                    "Chat ID and message are required",
                ));
            }
        };

        let now = (self.clock)();
        let mut chats = self.chats.lock();
        let chat = chats
            .iter_mut()
            .find(|chat| chat.id == chat_id)
            .ok_or(StoreError::ChatNotFound(chat_id))?;

        let message = Message {
            id: chat.messages.len() as u64 + 1,
            sender: CURRENT_USER.to_string(),
            content: content.clone(),
            time: now.with_timezone(&self.timezone).format("%H:%M").to_string(),
            is_current_user: true,
            timestamp: now,
            read: false,
        };
        chat.messages.push(message.clone());
        chat.content = content;

        info!(
            chat_id,
            message_id = message.id,
            total = chat.messages.len(),
            "message appended"
        );
        Ok(SentMessage {
            message,
            chat: chat.clone(),
        })
    }
}
