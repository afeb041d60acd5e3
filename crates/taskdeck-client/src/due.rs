//! Due-date classification for a task row.

use std::fmt;

use chrono::{DateTime, Utc};

const DAY_MS: i64 = 86_400_000;

/// Days from `now` until `due`, rounded up. Anything still ahead today counts
/// as one day left; anything less than a day past is due today.
pub fn days_left(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (due - now).num_milliseconds();
    let days = ms / DAY_MS;
    if ms % DAY_MS > 0 { days + 1 } else { days }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue(i64),
    Today,
    Left(i64),
}

impl DueStatus {
    pub fn from_days_left(days: i64) -> Self {
        match days {
            d if d < 0 => Self::Overdue(d.abs()),
            0 => Self::Today,
            d => Self::Left(d),
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::Overdue(_))
    }

    /// Due today or within `window` days.
    pub fn is_due_soon(&self, window: i64) -> bool {
        match self {
            Self::Overdue(_) => false,
            Self::Today => true,
            Self::Left(days) => *days <= window,
        }
    }

    pub fn tone(&self, window: i64) -> DueTone {
        if self.is_overdue() || self.is_due_soon(window) {
            DueTone::Warning
        } else {
            DueTone::Neutral
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue(days) => write!(f, "{days} Days Overdue"),
            Self::Today => f.write_str("Due Today"),
            Self::Left(1) => f.write_str("1 Day left"),
            Self::Left(days) => write!(f, "{days} Days left"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueTone {
    Warning,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueReport {
    pub days_left: i64,
    pub status: DueStatus,
    pub tone: DueTone,
}

pub fn classify(due: DateTime<Utc>, now: DateTime<Utc>, soon_days: i64) -> DueReport {
    let days_left = days_left(due, now);
    let status = DueStatus::from_days_left(days_left);
    DueReport {
        days_left,
        status,
        tone: status.tone(soon_days),
    }
}
