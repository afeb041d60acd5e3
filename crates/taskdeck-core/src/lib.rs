pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod inbox;
pub mod seed;
pub mod store;
pub mod task;

pub use error::StoreError;
pub use inbox::InboxStore;
pub use store::TaskStore;
pub use task::{
  SENTINEL_TITLE,
  Task,
  TaskDraft,
  TaskId,
  TaskUpdates
};
