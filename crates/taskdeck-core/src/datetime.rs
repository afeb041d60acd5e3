use chrono::{
  DateTime,
  Duration,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  SecondsFormat,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

use crate::error::StoreError;

const DATE_ONLY_FORMAT: &str =
  "%Y-%m-%d";

/// Parses a wire due date.
///
/// Accepts RFC 3339 timestamps (what
/// the dashboard sends) and bare
/// `YYYY-MM-DD` dates, which are read
/// as UTC midnight. Anything else is a
/// validation failure.
pub fn parse_due_date(
  raw: &str
) -> Result<DateTime<Utc>, StoreError> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(StoreError::validation(
      "dueDate cannot be empty"
    ));
  }

  if let Ok(parsed) =
    DateTime::parse_from_rfc3339(
      trimmed
    )
  {
    return Ok(
      parsed.with_timezone(&Utc)
    );
  }

  NaiveDate::parse_from_str(
    trimmed,
    DATE_ONLY_FORMAT
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
  .map(|naive| {
    DateTime::<Utc>::from_naive_utc_and_offset(
      naive, Utc
    )
  })
  .ok_or_else(|| {
    tracing::debug!(
      input = %trimmed,
      "rejected due date"
    );
    StoreError::validation(format!(
      "invalid dueDate: {trimmed}"
    ))
  })
}

/// Wire form of a timestamp:
/// millisecond RFC 3339 in UTC.
#[must_use]
pub fn format_wire(
  dt: DateTime<Utc>
) -> String {
  dt.to_rfc3339_opts(
    SecondsFormat::Millis,
    true
  )
}

#[must_use]
pub fn local_date(
  dt: DateTime<Utc>,
  timezone: Tz
) -> NaiveDate {
  dt.with_timezone(&timezone)
    .date_naive()
}

/// Start of `date` in `timezone`,
/// expressed in UTC.
///
/// Midnight can be skipped by a DST
/// jump; the first hour after the gap
/// is used then.
#[must_use]
pub fn local_midnight_utc(
  date: NaiveDate,
  timezone: Tz
) -> DateTime<Utc> {
  let midnight: NaiveDateTime =
    date.and_time(NaiveTime::MIN);

  match timezone
    .from_local_datetime(&midnight)
  {
    | LocalResult::Single(local) => {
      local.with_timezone(&Utc)
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      let chosen = if first <= second {
        first
      } else {
        second
      };
      chosen.with_timezone(&Utc)
    }
    | LocalResult::None => {
      tracing::warn!(
        date = %date,
        timezone = %timezone,
        "local midnight skipped by \
         offset change; using next \
         hour"
      );
      timezone
        .from_local_datetime(
          &(midnight
            + Duration::hours(1))
        )
        .earliest()
        .map(|local| {
          local.with_timezone(&Utc)
        })
        .unwrap_or_else(|| {
          DateTime::<Utc>::from_naive_utc_and_offset(
            midnight, Utc
          )
        })
    }
  }
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}
