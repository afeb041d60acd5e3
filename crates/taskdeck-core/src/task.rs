use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::parse_due_date;
use crate::error::StoreError;

/// Title given to a task the user has not confirmed yet.
pub const SENTINEL_TITLE: &str = "Type Task Title";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    pub fn is_unconfirmed(&self) -> bool {
        is_sentinel_title(&self.title)
    }
}

pub fn is_sentinel_title(title: &str) -> bool {
    title.is_empty() || title == SENTINEL_TITLE
}

/// Validated input for [`crate::TaskStore::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Self, StoreError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoreError::validation("title is required"));
        }
        Ok(Self {
            title,
            description: description.into(),
            due_date,
        })
    }

    /// Builds a draft from loosely typed request fields.
    ///
    /// `title` must be present and non-blank, `description` defaults to the
    /// empty string and `due` may be absent for an unconfirmed task.
    pub fn parse(
        title: Option<String>,
        description: Option<String>,
        due: Option<&str>,
    ) -> Result<Self, StoreError> {
        let title = title.ok_or_else(|| StoreError::validation("title is required"))?;
        let due_date = due.map(parse_due_date).transpose()?;
        Self::new(title, description.unwrap_or_default(), due_date)
    }
}

/// Partial update merged into a stored task. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdates {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub is_completed: Option<bool>,
}

impl TaskUpdates {
    pub fn parse(
        title: Option<String>,
        description: Option<String>,
        due: Option<Option<&str>>,
        is_completed: Option<bool>,
    ) -> Result<Self, StoreError> {
        if title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(StoreError::validation("title cannot be blank"));
        }
        Ok(Self {
            title,
            description,
            due_date: due
                .map(|raw| raw.map(parse_due_date).transpose())
                .transpose()?,
            is_completed,
        })
    }

    pub fn completion(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.is_completed.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_title() {
        let err = TaskDraft::parse(None, Some("body".into()), None).expect_err("missing title");
        assert!(matches!(err, StoreError::Validation(_)));

        let err = TaskDraft::parse(Some("   ".into()), None, None).expect_err("blank title");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn draft_rejects_unparseable_due_date() {
        let err = TaskDraft::parse(Some("Ship".into()), None, Some("next tuesday"))
            .expect_err("free-form dates are not accepted");
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn updates_leave_absent_fields_alone() {
        let mut task = Task {
            id: TaskId::new("7"),
            title: "Draft".into(),
            description: "keep me".into(),
            due_date: None,
            is_completed: false,
        };

        TaskUpdates::completion(true).apply_to(&mut task);

        assert!(task.is_completed);
        assert_eq!(task.title, "Draft");
        assert_eq!(task.description, "keep me");
    }

    #[test]
    fn explicit_null_due_date_clears_it() {
        let mut task = Task {
            id: TaskId::new("7"),
            title: "Draft".into(),
            description: String::new(),
            due_date: Some(parse_due_date("2024-01-12").expect("date")),
            is_completed: false,
        };

        let untouched = TaskUpdates::parse(Some("Draft v2".into()), None, None, None)
            .expect("title only");
        untouched.apply_to(&mut task);
        assert!(task.due_date.is_some());

        let cleared = TaskUpdates::parse(None, None, Some(None), None).expect("null due");
        assert!(!cleared.is_empty());
        cleared.apply_to(&mut task);
        assert_eq!(task.due_date, None);
        assert_eq!(task.title, "Draft v2");
    }

    #[test]
    fn sentinel_and_empty_titles_are_unconfirmed() {
        assert!(is_sentinel_title(SENTINEL_TITLE));
        assert!(is_sentinel_title(""));
        assert!(!is_sentinel_title("Buy milk"));
    }
}
