//! Per-task interaction state.
//!
//! A [`TaskController`] owns one persisted [`Task`] plus its
//! [`TaskViewState`]. User actions mutate the view immediately and hand back
//! the [`TaskCall`] the host must send to the server; the next list refresh
//! goes through [`TaskController::reconcile`] and wins over local state.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use taskdeck_core::datetime::{format_wire, local_date, local_midnight_utc};
use taskdeck_core::task::is_sentinel_title;
use taskdeck_core::{Task, TaskId};
use taskdeck_shared::TaskPatch;
use tracing::{debug, instrument, warn};

use crate::bookmarks::{BookmarkChange, BookmarkError, BookmarkPalette, BookmarkSet};
use crate::calendar::{CalendarCell, MonthCursor, month_grid};
use crate::due::{DueReport, DueTone, classify};
use crate::popover::{Dismiss, Point, Popover, PopoverKind, Region, dismiss_outside};
use crate::view_config::TaskRowConfig;

/// Store call produced by a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCall {
    Patch { id: TaskId, patch: TaskPatch },
    Delete { id: TaskId },
}

impl TaskCall {
    pub fn id(&self) -> &TaskId {
        match self {
            Self::Patch { id, .. } | Self::Delete { id } => id,
        }
    }
}

/// Inline text editor: viewing, or editing with a local buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    editing: bool,
    pending: String,
}

impl TextEdit {
    fn viewing(persisted: &str) -> Self {
        Self {
            editing: false,
            pending: persisted.to_string(),
        }
    }

    fn editing(persisted: &str) -> Self {
        Self {
            editing: true,
            pending: persisted.to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    fn begin(&mut self, persisted: &str) {
        if !self.editing {
            self.pending = persisted.to_string();
            self.editing = true;
        }
    }

    fn set(&mut self, text: impl Into<String>) {
        self.pending = text.into();
    }

    /// Leaves edit mode; yields the buffer when it differs from `persisted`.
    fn commit(&mut self, persisted: &str) -> Option<String> {
        if !self.editing {
            return None;
        }
        self.editing = false;
        (self.pending != persisted).then(|| self.pending.clone())
    }

    fn cancel(&mut self, persisted: &str) {
        self.editing = false;
        self.pending = persisted.to_string();
    }

    fn sync(&mut self, persisted: &str) {
        if !self.editing {
            self.pending = persisted.to_string();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewState {
    pub is_expanded: bool,
    pub title: TextEdit,
    pub description: TextEdit,
    pub calendar_cursor: MonthCursor,
    /// Date shown in the date field; may run ahead of the persisted due date.
    pub selected_due: Option<NaiveDate>,
    pub bookmarks: BookmarkSet,
    pub calendar: Popover,
    pub options: Popover,
    pub bookmark_menu: Popover,
}

#[derive(Debug, Clone)]
pub struct TaskController {
    task: Task,
    view: TaskViewState,
    config: Arc<TaskRowConfig>,
}

impl TaskController {
    /// Unconfirmed tasks start expanded with the title editor open.
    pub fn new(task: Task, config: Arc<TaskRowConfig>, today: NaiveDate) -> Self {
        let fresh = is_sentinel_title(&task.title);
        let due = task.due_date.map(|due| local_date(due, config.timezone));
        let view = TaskViewState {
            is_expanded: fresh,
            title: if fresh {
                TextEdit::editing(&task.title)
            } else {
                TextEdit::viewing(&task.title)
            },
            description: TextEdit::viewing(&task.description),
            calendar_cursor: MonthCursor::containing(due.unwrap_or(today)),
            selected_due: if fresh { None } else { due },
            bookmarks: BookmarkSet::new(BookmarkPalette::builtin()),
            calendar: Popover::default(),
            options: Popover::default(),
            bookmark_menu: Popover::default(),
        };
        Self { task, view, config }
    }

    pub fn id(&self) -> &TaskId {
        &self.task.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn view(&self) -> &TaskViewState {
        &self.view
    }

    pub fn config(&self) -> &TaskRowConfig {
        &self.config
    }

    pub fn is_unconfirmed(&self) -> bool {
        is_sentinel_title(&self.task.title)
    }

    pub fn toggle_expanded(&mut self) -> bool {
        self.view.is_expanded = !self.view.is_expanded;
        self.view.is_expanded
    }

    pub fn begin_title_edit(&mut self) {
        self.view.title.begin(&self.task.title);
    }

    pub fn set_title_buffer(&mut self, text: impl Into<String>) {
        self.view.title.set(text);
    }

    /// Blur or Enter on the title field.
    ///
    /// A blank buffer is put back to the persisted title with no call. The
    /// first title given to an unconfirmed task also carries any date picked
    /// while it was unconfirmed, so confirming costs a single patch.
    #[instrument(skip(self), fields(id = %self.task.id))]
    pub fn commit_title(&mut self) -> Option<TaskCall> {
        let was_unconfirmed = self.is_unconfirmed();
        let title = self.view.title.commit(&self.task.title)?;
        if title.trim().is_empty() {
            debug!("blank title discarded");
            self.view.title.cancel(&self.task.title);
            return None;
        }

        let mut patch = TaskPatch {
            title: Some(title.clone()),
            ..TaskPatch::default()
        };
        if was_unconfirmed && !is_sentinel_title(&title) {
            if let Some(date) = self.view.selected_due {
                let due = local_midnight_utc(date, self.config.timezone);
                self.task.due_date = Some(due);
                patch.due_date = Some(Some(format_wire(due)));
            }
        }
        self.task.title = title;
        Some(self.patch(patch))
    }

    /// Escape on the title field.
    pub fn cancel_title_edit(&mut self) {
        self.view.title.cancel(&self.task.title);
    }

    pub fn begin_description_edit(&mut self) {
        self.view.description.begin(&self.task.description);
    }

    pub fn set_description_buffer(&mut self, text: impl Into<String>) {
        self.view.description.set(text);
    }

    #[instrument(skip(self), fields(id = %self.task.id))]
    pub fn commit_description(&mut self) -> Option<TaskCall> {
        let description = self.view.description.commit(&self.task.description)?;
        self.task.description = description.clone();
        Some(self.patch(TaskPatch {
            description: Some(description),
            ..TaskPatch::default()
        }))
    }

    pub fn cancel_description_edit(&mut self) {
        self.view.description.cancel(&self.task.description);
    }

    pub fn open_calendar(&mut self) {
        self.view.calendar.open();
    }

    /// Click on the date field.
    pub fn toggle_calendar(&mut self) -> bool {
        self.view.calendar.toggle()
    }

    pub fn show_month(&mut self, cursor: MonthCursor) {
        self.view.calendar_cursor = cursor;
    }

    pub fn prev_month(&mut self) -> MonthCursor {
        self.view.calendar_cursor = self.view.calendar_cursor.prev();
        self.view.calendar_cursor
    }

    pub fn next_month(&mut self) -> MonthCursor {
        self.view.calendar_cursor = self.view.calendar_cursor.next();
        self.view.calendar_cursor
    }

    /// Picks `day` of the month under the cursor and closes the calendar.
    ///
    /// Confirmed tasks get a patch right away; unconfirmed ones keep the
    /// date locally until their title is committed.
    #[instrument(skip(self), fields(id = %self.task.id))]
    pub fn select_day(&mut self, day: u32) -> Option<TaskCall> {
        let Some(date) = self.view.calendar_cursor.date(day) else {
            warn!(day, cursor = %self.view.calendar_cursor.title(), "day outside month");
            return None;
        };

        self.view.selected_due = Some(date);
        self.view.calendar.request_close();

        if self.is_unconfirmed() {
            debug!(%date, "holding due date until the title is confirmed");
            return None;
        }

        let due = local_midnight_utc(date, self.config.timezone);
        self.task.due_date = Some(due);
        Some(self.patch(TaskPatch {
            due_date: Some(Some(format_wire(due))),
            ..TaskPatch::default()
        }))
    }

    /// Checkbox click. Leaves expand and edit state alone.
    pub fn toggle_completion(&mut self) -> TaskCall {
        self.task.is_completed = !self.task.is_completed;
        self.patch(TaskPatch {
            is_completed: Some(self.task.is_completed),
            ..TaskPatch::default()
        })
    }

    pub fn toggle_options(&mut self) -> bool {
        self.view.options.toggle()
    }

    /// "Delete" in the options menu.
    pub fn delete(&mut self) -> TaskCall {
        self.view.options.request_close();
        TaskCall::Delete {
            id: self.task.id.clone(),
        }
    }

    pub fn toggle_bookmark_menu(&mut self) -> bool {
        self.view.bookmark_menu.toggle()
    }

    pub fn toggle_bookmark(&mut self, label: &str) -> Result<BookmarkChange, BookmarkError> {
        let result = self
            .view
            .bookmarks
            .toggle(BookmarkPalette::builtin(), label);
        if let Err(err) = &result {
            warn!(id = %self.task.id, error = %err, "bookmark change rejected");
        }
        result
    }

    pub fn request_close(&mut self, kind: PopoverKind) -> bool {
        self.popover_mut(kind).request_close()
    }

    /// Pointer-down from the host; closes every open popover whose region
    /// does not contain `at`. Popovers without a region are left alone.
    pub fn pointer_down(&mut self, at: Point, regions: &[(PopoverKind, Region)]) -> Vec<PopoverKind> {
        regions
            .iter()
            .filter(|(kind, region)| dismiss_outside(self.popover_mut(*kind), *region, at))
            .map(|(kind, _)| *kind)
            .collect()
    }

    fn popover_mut(&mut self, kind: PopoverKind) -> &mut Popover {
        match kind {
            PopoverKind::Calendar => &mut self.view.calendar,
            PopoverKind::Options => &mut self.view.options,
            PopoverKind::Bookmarks => &mut self.view.bookmark_menu,
        }
    }

    pub fn calendar_grid(&self) -> Vec<CalendarCell> {
        month_grid(self.view.calendar_cursor, self.view.selected_due)
    }

    /// Status for the row header; `None` until a due date is confirmed.
    pub fn due_report(&self, now: DateTime<Utc>) -> Option<DueReport> {
        if self.is_unconfirmed() {
            return None;
        }
        self.task
            .due_date
            .map(|due| classify(due, now, self.config.due_soon_days))
    }

    pub fn status_color(&self, now: DateTime<Utc>) -> Option<&str> {
        self.due_report(now).map(|report| match report.tone {
            DueTone::Warning => self.config.warning_color.as_str(),
            DueTone::Neutral => self.config.neutral_color.as_str(),
        })
    }

    pub fn date_label(&self) -> String {
        match self.view.selected_due {
            Some(date) => date.format(&self.config.date_format).to_string(),
            None => self.config.empty_date.clone(),
        }
    }

    pub fn date_icon_color(&self) -> &str {
        if self.view.selected_due.is_some() {
            &self.config.accent_color
        } else {
            &self.config.icon_neutral_color
        }
    }

    pub fn description_label(&self) -> &str {
        let text = self.view.description.pending();
        if self.config.has_description(text) {
            text
        } else {
            &self.config.empty_description
        }
    }

    pub fn description_icon_color(&self) -> &str {
        if self.config.has_description(&self.task.description) {
            &self.config.accent_color
        } else {
            &self.config.icon_neutral_color
        }
    }

    /// Adopts the server's copy of the task.
    ///
    /// Open edit buffers survive. A local date pick survives only while the
    /// task is still unconfirmed.
    pub fn reconcile(&mut self, task: Task) {
        if task != self.task {
            debug!(id = %task.id, "task changed on refresh");
        }
        self.task = task;
        self.view.title.sync(&self.task.title);
        self.view.description.sync(&self.task.description);
        if !self.is_unconfirmed() {
            self.view.selected_due = self
                .task
                .due_date
                .map(|due| local_date(due, self.config.timezone));
        }
    }

    fn patch(&self, patch: TaskPatch) -> TaskCall {
        TaskCall::Patch {
            id: self.task.id.clone(),
            patch,
        }
    }
}
