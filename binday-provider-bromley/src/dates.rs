//! Parsing of the site's year-less display dates into absolute timestamps.
//!
//! The page prints dates like `Monday, 5th May`, sometimes with a trailing
//! parenthetical note, and last-collection rows append a time such as
//! `, at 7:00am`. The text never carries a year, so the calendar occurrence
//! nearest to the current date is chosen; an exact tie resolves to the
//! future occurrence. All resolved instants are UTC; date-only strings
//! resolve to midnight.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

/// Resolve a next-collection display string to an absolute instant.
pub(crate) fn next_collection_utc(text: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    let (date, _time) = parse_date_text(text, today)?;
    Some(utc_at(date, NaiveTime::MIN))
}

/// Resolve a last-collection display string, honouring its time suffix.
pub(crate) fn last_collection_utc(text: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    let (date, time) = parse_date_text(text, today)?;
    Some(utc_at(date, time.unwrap_or(NaiveTime::MIN)))
}

fn parse_date_text(text: &str, today: NaiveDate) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let cleaned = strip_annotation(text);
    if cleaned.is_empty() {
        return None;
    }
    let segments: Vec<&str> = cleaned.split(',').map(str::trim).collect();
    let date = segments
        .iter()
        .copied()
        .find_map(|segment| parse_day_month(segment, today))?;
    let time = segments.iter().copied().find_map(parse_time_segment);
    Some((date, time))
}

/// Drop everything from the first `(` onward.
fn strip_annotation(text: &str) -> &str {
    text.split('(').next().unwrap_or(text).trim()
}

/// Parse a `5th May` style segment and resolve its year.
fn parse_day_month(segment: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut tokens = segment.split_whitespace();
    let day_token = tokens.next()?;
    let month_token = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    let day: u32 = day_token
        .trim_end_matches(|ch: char| ch.is_ascii_alphabetic())
        .parse()
        .ok()?;
    let month = month_number(month_token)?;
    resolve_year(day, month, today)
}

/// Parse an `at 7:00am` style segment.
fn parse_time_segment(segment: &str) -> Option<NaiveTime> {
    let time_text = segment.strip_prefix("at ")?.trim();
    NaiveTime::parse_from_str(time_text, "%I:%M%P").ok()
}

fn month_number(token: &str) -> Option<u32> {
    let month = match token.to_ascii_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Pick the year that puts `day`/`month` closest to `today`.
///
/// Only the previous, current, and next year are candidates; invalid
/// combinations (29th February in a non-leap year) are skipped. An exact
/// distance tie picks the later date.
fn resolve_year(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let current_year = today.year();
    let mut best: Option<NaiveDate> = None;
    for year in [current_year - 1, current_year, current_year + 1] {
        let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        best = match best {
            None => Some(candidate),
            Some(current_best) if closer_to(today, candidate, current_best) => Some(candidate),
            Some(current_best) => Some(current_best),
        };
    }
    best
}

fn closer_to(today: NaiveDate, candidate: NaiveDate, best: NaiveDate) -> bool {
    let candidate_distance = (candidate - today).num_days().abs();
    let best_distance = (best - today).num_days().abs();
    candidate_distance < best_distance
        || (candidate_distance == best_distance && candidate > best)
}

fn utc_at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}
