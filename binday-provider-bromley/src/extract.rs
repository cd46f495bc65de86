//! DOM extraction of the rendered results page into a schedule.

use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::warn;

use binday_core::model::{CollectionEntry, Schedule};

use crate::dates;

const HEADING_SELECTOR: &str = "h3.govuk-heading-m.waste-service-name";
const ROW_SELECTOR: &str = "div.govuk-summary-list__row";
const ROW_KEY_SELECTOR: &str = "dt.govuk-summary-list__key";
const ROW_VALUE_SELECTOR: &str = "dd.govuk-summary-list__value";

/// Extract the collection schedule from rendered markup.
///
/// Category headings and the "Next collection" / "Last collection" row values
/// are collected independently, each in document order, then paired by
/// position: the i-th heading gets the i-th next value and the i-th last
/// value. That mirrors how the page lays out one of each row per service; a
/// page that interleaves them differently will mispair.
///
/// A category missing either date, or whose dates cannot be resolved, is
/// dropped from the schedule. A page without recognizable headings yields an
/// empty schedule; `None` only means the markup could not be processed at
/// all.
pub(crate) fn schedule_from_markup(markup: &str, today: NaiveDate) -> Option<Schedule> {
    let document = Html::parse_document(markup);

    let headings = Selector::parse(HEADING_SELECTOR).ok()?;
    let rows = Selector::parse(ROW_SELECTOR).ok()?;
    let row_keys = Selector::parse(ROW_KEY_SELECTOR).ok()?;
    let row_values = Selector::parse(ROW_VALUE_SELECTOR).ok()?;

    let categories: Vec<String> = document
        .select(&headings)
        .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
        .collect();

    let mut next_values: Vec<String> = Vec::new();
    let mut last_values: Vec<String> = Vec::new();
    for row in document.select(&rows) {
        let Some(label) = row.select(&row_keys).next() else {
            continue;
        };
        let value = row
            .select(&row_values)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .unwrap_or_default();
        match collapse_whitespace(&label.text().collect::<String>()).as_str() {
            "Next collection" => next_values.push(value),
            "Last collection" => last_values.push(value),
            _ => {}
        }
    }

    let mut schedule = Schedule::new();
    for (position, category) in categories.iter().enumerate() {
        match build_entry(category, next_values.get(position), last_values.get(position), today) {
            Some(entry) => schedule.insert(entry),
            None => warn!("skipping category {category:?}: incomplete collection dates"),
        }
    }
    Some(schedule)
}

fn build_entry(
    category: &str,
    next_text: Option<&String>,
    last_text: Option<&String>,
    today: NaiveDate,
) -> Option<CollectionEntry> {
    let next_text = next_text?;
    let last_text = last_text?;
    let next_collection_utc = dates::next_collection_utc(next_text, today)?;
    let last_collection_utc = dates::last_collection_utc(last_text, today)?;
    Some(CollectionEntry {
        category: category.to_owned(),
        next_collection: next_text.clone(),
        next_collection_utc,
        last_collection: last_text.clone(),
        last_collection_utc,
    })
}

/// Collapse every run of whitespace to a single space and trim the ends.
///
/// Rendered values span several DOM text nodes with heavy indentation
/// between them.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
