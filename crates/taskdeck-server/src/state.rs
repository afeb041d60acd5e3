use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use taskdeck_core::datetime::format_wire;
use taskdeck_core::inbox::{Chat, Message, Participant, SentMessage};
use taskdeck_core::seed::{demo_chats, demo_tasks};
use taskdeck_core::{InboxStore, StoreError, Task, TaskDraft, TaskId, TaskStore, TaskUpdates};
use taskdeck_shared::{
    ChatDto, ChatsDto, MessageDto, ParticipantDto, SendMessageArgs, SendMessageResult, TaskCreate,
    TaskDto, TaskIdArg, TaskUpdateArgs,
};
use tracing::{debug, info, instrument};

/// Shared handle given to every request handler.
///
/// One instance is built at process start and dropped at shutdown; the
/// stores it owns are volatile.
#[derive(Clone, Debug)]
pub struct AppState {
    tasks: Arc<TaskStore>,
    inbox: Arc<InboxStore>,
}

impl AppState {
    pub fn new(tasks: TaskStore, inbox: InboxStore) -> Self {
        Self {
            tasks: Arc::new(tasks),
            inbox: Arc::new(inbox),
        }
    }

    /// Empty task list and inbox.
    pub fn empty() -> Self {
        Self::new(TaskStore::new(), InboxStore::default())
    }

    /// State preloaded with the demo tasks and chats.
    #[instrument]
    pub fn seeded(now: DateTime<Utc>, timezone: Tz) -> Self {
        info!(timezone = %timezone, "seeding demo tasks and chats");
        Self::new(
            TaskStore::with_tasks(demo_tasks(now)),
            InboxStore::with_clock(demo_chats(now), Arc::new(Utc::now), timezone),
        )
    }

    pub fn task_store(&self) -> &TaskStore {
        &self.tasks
    }

    #[instrument(skip(self))]
    pub fn list(&self) -> Vec<TaskDto> {
        self.tasks.list().into_iter().map(task_to_dto).collect()
    }

    #[instrument(skip(self, create))]
    pub fn add(&self, create: TaskCreate) -> Result<TaskDto, StoreError> {
        let draft = TaskDraft::parse(create.title, create.description, create.due_date.as_deref())?;
        Ok(task_to_dto(self.tasks.create(draft)))
    }

    #[instrument(skip(self, args), fields(id = ?args.id))]
    pub fn update(&self, args: TaskUpdateArgs) -> Result<(), StoreError> {
        let id = require_id(args.id)?;
        let patch = args.updates;
        let updates = TaskUpdates::parse(
            patch.title,
            patch.description,
            patch.due_date.as_ref().map(Option::as_deref),
            patch.is_completed,
        )?;
        if updates.is_empty() {
            debug!(id = %id, "empty update payload");
            return Ok(());
        }
        self.tasks.patch(&id, &updates);
        Ok(())
    }

    #[instrument(skip(self, args), fields(id = ?args.id))]
    pub fn delete(&self, args: TaskIdArg) -> Result<(), StoreError> {
        let id = require_id(args.id)?;
        self.tasks.delete(&id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn chats(&self) -> ChatsDto {
        ChatsDto {
            chats: self.inbox.list().into_iter().map(chat_to_dto).collect(),
        }
    }

    #[instrument(skip(self, args), fields(chat_id = ?args.chat_id))]
    pub fn send(&self, args: SendMessageArgs) -> Result<SendMessageResult, StoreError> {
        let SentMessage { message, chat } = self.inbox.send(args.chat_id, args.message)?;
        Ok(SendMessageResult {
            success: true,
            message: message_to_dto(message),
            chat: chat_to_dto(chat),
        })
    }
}

fn require_id(raw: Option<String>) -> Result<TaskId, StoreError> {
    match raw {
        Some(id) if !id.trim().is_empty() => Ok(TaskId::new(id)),
        _ => Err(StoreError::validation("id is required")),
    }
}

pub fn task_to_dto(task: Task) -> TaskDto {
    TaskDto {
        id: task.id.to_string(),
        title: task.title,
        description: task.description,
        due_date: task.due_date.map(format_wire),
        is_completed: task.is_completed,
    }
}

fn participant_to_dto(participant: Participant) -> ParticipantDto {
    ParticipantDto {
        id: participant.id,
        name: participant.name,
        role: participant.role,
    }
}

fn message_to_dto(message: Message) -> MessageDto {
    MessageDto {
        id: message.id,
        sender: message.sender,
        content: message.content,
        time: message.time,
        is_current_user: message.is_current_user,
        timestamp: format_wire(message.timestamp),
        read: message.read,
    }
}

fn chat_to_dto(chat: Chat) -> ChatDto {
    ChatDto {
        id: chat.id,
        title: chat.title,
        name: chat.name,
        content: chat.content,
        participants: chat.participants.into_iter().map(participant_to_dto).collect(),
        messages: chat.messages.into_iter().map(message_to_dto).collect(),
    }
}
