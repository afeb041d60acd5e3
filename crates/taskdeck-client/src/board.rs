use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use taskdeck_core::datetime::{local_date, parse_due_date};
use taskdeck_core::store::Clock;
use taskdeck_core::{SENTINEL_TITLE, Task, TaskId};
use taskdeck_shared::{TaskCreate, TaskDto};
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiError, TaskApi};
use crate::controller::{TaskCall, TaskController};
use crate::view_config::TaskRowConfig;

/// Result of sending one call and refreshing afterwards.
#[derive(Debug)]
pub enum SyncReport {
    Synced,
    /// The call failed; nothing was refreshed and rows keep their local state.
    CallFailed(ApiError),
    /// The call went through but the follow-up list did not.
    RefreshFailed(ApiError),
}

impl SyncReport {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Synced => None,
            Self::CallFailed(err) | Self::RefreshFailed(err) => Some(err),
        }
    }
}

/// One controller per task, in server order.
pub struct TaskBoard {
    rows: Vec<TaskController>,
    config: Arc<TaskRowConfig>,
    clock: Clock,
}

impl std::fmt::Debug for TaskBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskBoard")
            .field("rows", &self.rows.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TaskBoard {
    pub fn new(config: TaskRowConfig) -> Self {
        Self::with_clock(config, Arc::new(Utc::now))
    }

    pub fn with_clock(config: TaskRowConfig, clock: Clock) -> Self {
        Self {
            rows: Vec::new(),
            config: Arc::new(config),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn rows(&self) -> &[TaskController] {
        &self.rows
    }

    pub fn row(&self, id: &TaskId) -> Option<&TaskController> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn row_mut(&mut self, id: &TaskId) -> Option<&mut TaskController> {
        self.rows.iter_mut().find(|row| row.id() == id)
    }

    /// Replaces the rows with `tasks`, keeping view state for ids that are
    /// still present.
    #[instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub fn reconcile(&mut self, tasks: Vec<TaskDto>) {
        let today = local_date(self.now(), self.config.timezone);
        let mut existing: HashMap<TaskId, TaskController> = self
            .rows
            .drain(..)
            .map(|row| (row.id().clone(), row))
            .collect();

        for dto in tasks {
            let task = task_from_dto(dto);
            let row = match existing.remove(&task.id) {
                Some(mut row) => {
                    row.reconcile(task);
                    row
                }
                None => {
                    debug!(id = %task.id, "new row");
                    TaskController::new(task, Arc::clone(&self.config), today)
                }
            };
            self.rows.push(row);
        }

        for id in existing.keys() {
            debug!(id = %id, "row dropped");
        }
    }

    pub async fn refresh<A: TaskApi>(&mut self, api: &A) -> Result<(), ApiError> {
        match api.list().await {
            Ok(tasks) => {
                self.reconcile(tasks);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "refreshing task list failed");
                Err(err)
            }
        }
    }

    /// Sends `call`, then refreshes. Failures are logged and reported, never
    /// retried.
    #[instrument(skip(self, api), fields(id = %call.id()))]
    pub async fn execute<A: TaskApi>(&mut self, api: &A, call: TaskCall) -> SyncReport {
        let sent = match call {
            TaskCall::Patch { id, patch } => api.update(id.as_str(), patch).await,
            TaskCall::Delete { id } => api.delete(id.as_str()).await,
        };
        if let Err(err) = sent {
            error!(error = %err, "task call failed; keeping local state");
            return SyncReport::CallFailed(err);
        }
        match self.refresh(api).await {
            Ok(()) => SyncReport::Synced,
            Err(err) => SyncReport::RefreshFailed(err),
        }
    }

    /// Runs `call` if there is one.
    pub async fn apply<A: TaskApi>(&mut self, api: &A, call: Option<TaskCall>) -> Option<SyncReport> {
        match call {
            Some(call) => Some(self.execute(api, call).await),
            None => None,
        }
    }

    /// Posts a placeholder task and refreshes; its row opens in title edit.
    #[instrument(skip(self, api))]
    pub async fn create_placeholder<A: TaskApi>(&mut self, api: &A) -> Result<TaskId, ApiError> {
        let created = api
            .create(TaskCreate {
                title: Some(SENTINEL_TITLE.to_string()),
                description: Some(String::new()),
                due_date: None,
            })
            .await
            .inspect_err(|err| error!(error = %err, "creating task failed"))?;
        info!(id = %created.id, "placeholder task created");
        let id = TaskId::new(created.id);
        self.refresh(api).await?;
        Ok(id)
    }
}

/// Converts a wire task, dropping a due date the client cannot read.
pub fn task_from_dto(dto: TaskDto) -> Task {
    let due_date = dto.due_date.as_deref().and_then(|raw| match parse_due_date(raw) {
        Ok(due) => Some(due),
        Err(err) => {
            warn!(id = %dto.id, raw, error = %err, "ignoring unreadable due date");
            None
        }
    });
    Task {
        id: TaskId::new(dto.id),
        title: dto.title,
        description: dto.description,
        due_date,
        is_completed: dto.is_completed,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dto(id: &str, title: &str) -> TaskDto {
        TaskDto {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            due_date: Some("2024-01-12T00:00:00.000Z".to_string()),
            is_completed: false,
        }
    }

    #[test]
    fn reconcile_follows_server_order_and_keeps_view_state() {
        let mut board = TaskBoard::new(TaskRowConfig::default());
        board.reconcile(vec![dto("1", "One"), dto("2", "Two")]);
        board
            .row_mut(&TaskId::new("2"))
            .expect("row 2")
            .toggle_expanded();

        board.reconcile(vec![dto("3", SENTINEL_TITLE), dto("2", "Two!")]);

        let ids: Vec<&str> = board.rows().iter().map(|row| row.id().as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        let two = board.row(&TaskId::new("2")).expect("row 2");
        assert!(two.view().is_expanded);
        assert_eq!(two.task().title, "Two!");
        assert!(board.row(&TaskId::new("3")).expect("row 3").view().title.is_editing());
    }

    #[test]
    fn unreadable_due_date_is_dropped() {
        let mut raw = dto("1", "One");
        raw.due_date = Some("next tuesday".into());
        assert_eq!(task_from_dto(raw).due_date, None);
    }
}
