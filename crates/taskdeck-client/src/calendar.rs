//! Month grid behind the due-date
//! picker.
//!
//! Months are zero-indexed (0 is
//! January) and weeks start on Monday.

use chrono::{
  Datelike,
  Duration,
  NaiveDate
};

pub const WEEKDAY_LABELS: [&str; 7] =
  ["M", "T", "W", "Th", "F", "S", "S"];

const MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December"
];

/// The (year, month) a picker is
/// showing. Independent of any due
/// date.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
pub struct MonthCursor {
  year:  i32,
  month: u32
}

impl MonthCursor {
  pub fn new(
    year: i32,
    month: u32
  ) -> Option<Self> {
    (month < 12)
      .then_some(Self { year, month })
  }

  pub fn containing(
    date: NaiveDate
  ) -> Self {
    Self {
      year:  date.year(),
      month: date.month0()
    }
  }

  pub fn year(&self) -> i32 {
    self.year
  }

  pub fn month(&self) -> u32 {
    self.month
  }

  pub fn prev(self) -> Self {
    match self.month {
      | 0 => {
        Self {
          year:  self
            .year
            .saturating_sub(1),
          month: 11
        }
      }
      | month => {
        Self {
          year:  self.year,
          month: month - 1
        }
      }
    }
  }

  pub fn next(self) -> Self {
    match self.month {
      | 11 => {
        Self {
          year:  self
            .year
            .saturating_add(1),
          month: 0
        }
      }
      | month => {
        Self {
          year:  self.year,
          month: month + 1
        }
      }
    }
  }

  /// Header text, e.g. "February 2024".
  pub fn title(&self) -> String {
    let name = MONTH_NAMES
      .get(self.month as usize)
      .copied()
      .unwrap_or_default();
    format!("{name} {}", self.year)
  }

  pub fn days_in_month(&self) -> u32 {
    days_in_month(self.year, self.month)
  }

  /// Weekday of day 1 with Sunday as 0.
  pub fn first_weekday(&self) -> u32 {
    first_day_of_month(
      self.year, self.month
    )
    .map(|day| {
      day
        .weekday()
        .num_days_from_sunday()
    })
    .unwrap_or(0)
  }

  /// The calendar date for `day` in this
  /// month, or `None` past the month's
  /// end.
  pub fn date(
    &self,
    day: u32
  ) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
      self.year,
      self.month + 1,
      day
    )
  }

  pub fn contains(
    &self,
    date: NaiveDate
  ) -> bool {
    date.year() == self.year
      && date.month0() == self.month
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
)]
pub enum CalendarCell {
  Empty,
  Day {
    day:      u32,
    selected: bool
  }
}

impl CalendarCell {
  pub fn day(&self) -> Option<u32> {
    match self {
      | Self::Empty => None,
      | Self::Day { day, .. } => {
        Some(*day)
      }
    }
  }

  pub fn is_selected(&self) -> bool {
    matches!(
      self,
      Self::Day { selected: true, .. }
    )
  }
}

/// Leading blanks for a Monday-first
/// week given a Sunday-zero weekday.
pub fn leading_offset(
  first_weekday: u32
) -> u32 {
  if first_weekday == 0 {
    6
  } else {
    first_weekday - 1
  }
}

/// Blank cells up to the first weekday,
/// then one cell per day. A day is
/// selected only when day, month, and
/// year all match `selected`.
pub fn month_grid(
  cursor: MonthCursor,
  selected: Option<NaiveDate>
) -> Vec<CalendarCell> {
  let offset =
    leading_offset(cursor.first_weekday());
  let days = cursor.days_in_month();
  let selected_day = selected
    .filter(|date| cursor.contains(*date))
    .map(|date| date.day());

  let mut cells = Vec::with_capacity(
    (offset + days) as usize
  );
  cells.extend(
    (0..offset).map(|_| CalendarCell::Empty)
  );
  cells.extend((1..=days).map(|day| {
    CalendarCell::Day {
      day,
      selected: selected_day == Some(day)
    }
  }));
  cells
}

/// Splits a grid into Monday-first
/// rows of seven.
pub fn weeks(
  cells: &[CalendarCell]
) -> Vec<Vec<CalendarCell>> {
  cells
    .chunks(7)
    .map(<[CalendarCell]>::to_vec)
    .collect()
}

fn first_day_of_month(
  year: i32,
  month: u32
) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(
    year,
    month + 1,
    1
  )
}

/// Day count via "day 0 of next month".
fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  let (next_year, next_month) =
    if month >= 11 {
      (year.saturating_add(1), 0_u32)
    } else {
      (year, month + 1)
    };
  first_day_of_month(
    next_year, next_month
  )
  .and_then(|first| {
    first.checked_sub_signed(
      Duration::days(1)
    )
  })
  .map(|last| last.day())
  .unwrap_or(31)
}
