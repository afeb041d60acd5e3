use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::task::{Task, TaskDraft, TaskId, TaskUpdates};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Authoritative, process-lifetime task list.
///
/// Newest tasks sit at the front. Every operation takes the lock once and
/// finishes its mutation before releasing it, so readers never observe a
/// half-applied change. Nothing is written to disk: dropping the store drops
/// the tasks.
pub struct TaskStore {
    inner: Mutex<StoreInner>,
    clock: Clock,
}

#[derive(Debug, Default)]
struct StoreInner {
    tasks: Vec<Task>,
    last_id: i64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            clock,
        }
    }

    /// Store preloaded with `tasks`, kept in the given order.
    #[tracing::instrument(skip(tasks), fields(count = tasks.len()))]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            inner.last_id = tasks
                .iter()
                .filter_map(|task| task.id.as_str().parse::<i64>().ok())
                .max()
                .unwrap_or(0);
            inner.tasks = tasks;
        }
        info!(count = store.len(), "task store seeded");
        store
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Vec<Task> {
        let tasks = self.inner.lock().tasks.clone();
        debug!(count = tasks.len(), "listed tasks");
        tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.inner
            .lock()
            .tasks
            .iter()
            .find(|task| &task.id == id)
            .cloned()
    }

    #[tracing::instrument(skip(self, draft), fields(title_len = draft.title.len(), has_due = draft.due_date.is_some()))]
    pub fn create(&self, draft: TaskDraft) -> Task {
        let now = (self.clock)();
        let mut inner = self.inner.lock();

        let id = inner.allocate_id(now.timestamp_millis());
        let task = Task {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            is_completed: false,
        };
        inner.tasks.insert(0, task.clone());

        info!(id = %task.id, total = inner.tasks.len(), "task created");
        task
    }

    /// Merges `updates` into the task with `id`.
    ///
    /// Returns whether a task matched; an unknown id leaves the list untouched.
    #[tracing::instrument(skip(self, updates), fields(id = %id))]
    pub fn patch(&self, id: &TaskId, updates: &TaskUpdates) -> bool {
        let mut inner = self.inner.lock();
        match inner.tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) => {
                updates.apply_to(task);
                debug!(
                    title = updates.title.is_some(),
                    description = updates.description.is_some(),
                    due_date = updates.due_date.is_some(),
                    is_completed = ?updates.is_completed,
                    "task patched"
                );
                true
            }
            None => {
                warn!("patch for unknown task ignored");
                false
            }
        }
    }

    /// Removes the task with `id`. Returns whether anything was removed.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn delete(&self, id: &TaskId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.tasks.len();
        inner.tasks.retain(|task| &task.id != id);
        let removed = inner.tasks.len() != before;
        if removed {
            info!(remaining = inner.tasks.len(), "task deleted");
        } else {
            warn!("delete for unknown task ignored");
        }
        removed
    }
}

impl StoreInner {
    /// Timestamp-derived id, bumped past the previous one so two creations in
    /// the same millisecond still get distinct, increasing ids.
    fn allocate_id(&mut self, now_millis: i64) -> TaskId {
        let mut candidate = now_millis.max(self.last_id.saturating_add(1));
        while self
            .tasks
            .iter()
            .any(|task| task.id.as_str() == candidate.to_string())
        {
            candidate = candidate.saturating_add(1);
        }
        self.last_id = candidate;
        TaskId::new(candidate.to_string())
    }
}
