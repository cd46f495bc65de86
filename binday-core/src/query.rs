//! Derived views over a schedule: the soonest upcoming collection and the
//! categories due tomorrow.
//!
//! "Tomorrow" is the next UTC calendar date after `now`; collection instants
//! are compared by their UTC calendar date only.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CollectionEntry, Schedule};
use crate::ports::ScheduleError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Summary of the soonest upcoming collection for a property.
pub struct NextCollections {
    /// Earliest next-collection instant across all categories.
    pub next_collection_date_utc: DateTime<Utc>,
    /// The same date formatted as `YYYY-MM-DD`.
    pub next_collection_date: String,
    /// Weekday name of that date.
    pub next_collection_date_day: String,
    /// Friendly rendering such as `Monday, May 5th`.
    pub next_collection_date_friendly: String,
    /// Whether that date is tomorrow.
    pub is_tomorrow: bool,
    /// Every category collected on that soonest date, in page order.
    pub bins: Vec<String>,
}

/// Summarize the soonest upcoming collection in a schedule.
///
/// All categories sharing the exact soonest instant are listed together, so
/// a day on which food waste and paper go out at once reports both bins.
///
/// # Errors
///
/// Returns [`ScheduleError::EmptySchedule`] when the schedule has no entries.
pub fn next_collections(
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> Result<NextCollections, ScheduleError> {
    let mut entries: Vec<&CollectionEntry> = schedule.entries().collect();
    entries.sort_by_key(|entry| entry.next_collection_utc);

    let soonest = entries
        .first()
        .map(|entry| entry.next_collection_utc)
        .ok_or(ScheduleError::EmptySchedule)?;
    let bins = entries
        .iter()
        .take_while(|entry| entry.next_collection_utc == soonest)
        .map(|entry| entry.category.clone())
        .collect();

    Ok(NextCollections {
        next_collection_date_utc: soonest,
        next_collection_date: soonest.format("%Y-%m-%d").to_string(),
        next_collection_date_day: soonest.format("%A").to_string(),
        next_collection_date_friendly: friendly_date(soonest),
        is_tomorrow: is_tomorrow(soonest, now),
        bins,
    })
}

/// Categories whose next collection falls on tomorrow's date, in page order.
///
/// An empty schedule simply yields an empty list.
#[must_use]
pub fn bins_for_tomorrow(schedule: &Schedule, now: DateTime<Utc>) -> Vec<String> {
    schedule
        .entries()
        .filter(|entry| is_tomorrow(entry.next_collection_utc, now))
        .map(|entry| entry.category.clone())
        .collect()
}

fn is_tomorrow(instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    instant.date_naive() == (now + Duration::days(1)).date_naive()
}

fn friendly_date(instant: DateTime<Utc>) -> String {
    format!(
        "{}, {} {}{}",
        instant.format("%A"),
        instant.format("%B"),
        instant.day(),
        ordinal_suffix(instant.day())
    )
}

/// English ordinal suffix for a day of the month (1-31).
fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}
