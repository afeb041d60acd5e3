//! Wire shapes exchanged between the
//! dashboard server and its clients.
//!
//! Keys are camelCase to match the
//! browser dashboard. Request payloads
//! keep every field optional so the
//! server can answer a missing field
//! with a validation error instead of
//! a decoder rejection.

use serde::{
  Deserialize,
  Deserializer,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  pub id:           String,
  pub title:        String,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub due_date:     Option<String>,
  #[serde(default)]
  pub is_completed: bool
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
  Eq,
)]
#[serde(
  default,
  rename_all = "camelCase"
)]
pub struct TaskCreate {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub due_date:    Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
  Eq,
)]
#[serde(
  default,
  rename_all = "camelCase"
)]
pub struct TaskPatch {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub title:        Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub description:  Option<String>,
  /// Outer `None` leaves the due date
  /// alone; `Some(None)` is an explicit
  /// `null` and clears it.
  #[serde(
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub due_date:     Option<Option<String>>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub is_completed: Option<bool>
}

/// Marks a key as present even when its
/// value is `null`. Absent keys fall back
/// to the field default.
fn present<'de, D, T>(
  deserializer: D
) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>
{
  Option::<T>::deserialize(deserializer)
    .map(Some)
}

impl TaskPatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.description.is_none()
      && self.due_date.is_none()
      && self.is_completed.is_none()
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct TaskUpdateArgs {
  pub id:      Option<String>,
  pub updates: TaskPatch
}

impl TaskUpdateArgs {
  pub fn new(
    id: impl Into<String>,
    updates: TaskPatch
  ) -> Self {
    Self {
      id: Some(id.into()),
      updates
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct TaskIdArg {
  pub id: Option<String>
}

impl TaskIdArg {
  pub fn new(
    id: impl Into<String>
  ) -> Self {
    Self {
      id: Some(id.into())
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SuccessDto {
  pub success: bool
}

impl SuccessDto {
  pub fn ok() -> Self {
    Self { success: true }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ErrorDto {
  pub error: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ParticipantDto {
  pub id:   u64,
  pub name: String,
  pub role: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
  pub id:              u64,
  pub sender:          String,
  pub content:         String,
  pub time:            String,
  pub is_current_user: bool,
  pub timestamp:       String,
  pub read:            bool
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ChatDto {
  pub id:           u64,
  pub title:        String,
  pub name:         String,
  pub content:      String,
  #[serde(default)]
  pub participants: Vec<ParticipantDto>,
  #[serde(default)]
  pub messages:     Vec<MessageDto>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ChatsDto {
  pub chats: Vec<ChatDto>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
  Eq,
)]
#[serde(
  default,
  rename_all = "camelCase"
)]
pub struct SendMessageArgs {
  pub chat_id: Option<u64>,
  pub message: Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SendMessageResult {
  pub success: bool,
  pub message: MessageDto,
  pub chat:    ChatDto
}
