//! Domain data structures for properties and their collection schedules.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a property known to the council site.
pub struct PropertyId(pub u32);

impl PropertyId {
    /// Parse a raw request parameter into a property id.
    ///
    /// Surrounding whitespace is tolerated; anything that is not a
    /// non-negative integer yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().map(Self)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Collection dates for a single waste category.
pub struct CollectionEntry {
    /// Waste category heading exactly as it appears on the page.
    pub category: String,
    /// Next collection display string, annotations included.
    #[serde(rename = "nextCollection")]
    pub next_collection: String,
    /// Next collection resolved to an absolute instant.
    #[serde(rename = "nextCollectionUTC")]
    pub next_collection_utc: DateTime<Utc>,
    /// Last collection display string, annotations included.
    #[serde(rename = "lastCollection")]
    pub last_collection: String,
    /// Last collection resolved to an absolute instant.
    #[serde(rename = "lastCollectionUTC")]
    pub last_collection_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Per-property schedule mapping each waste category to its collection dates.
///
/// Categories keep the order in which they appear on the results page, so a
/// serialized schedule reads top to bottom like the page itself.
pub struct Schedule {
    entries: IndexMap<String, CollectionEntry>,
}

impl Schedule {
    /// Create an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under its category name, replacing any previous entry
    /// for the same category.
    pub fn insert(&mut self, entry: CollectionEntry) {
        self.entries.insert(entry.category.clone(), entry);
    }

    /// Look up the entry for a category.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CollectionEntry> {
        self.entries.get(category)
    }

    /// Entries in the order their categories appear on the page.
    pub fn entries(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.entries.values()
    }

    /// Number of categories in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule contains no categories at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Cached schedule for one property together with the time it was captured.
pub struct CacheEntry {
    /// The schedule as parsed from the page.
    pub schedule: Schedule,
    /// When the schedule was fetched, used for freshness checks.
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{CacheEntry, CollectionEntry, PropertyId, Schedule};

    fn entry(category: &str) -> CollectionEntry {
        CollectionEntry {
            category: category.to_owned(),
            next_collection: "Monday, 5th May".to_owned(),
            next_collection_utc: Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).single().expect("valid date"),
            last_collection: "Monday, 28th April, at 7:00am".to_owned(),
            last_collection_utc: Utc.with_ymd_and_hms(2025, 4, 28, 7, 0, 0).single().expect("valid date"),
        }
    }

    #[test]
    fn property_id_parses_integers_only() {
        assert_eq!(PropertyId::parse("12345"), Some(PropertyId(12345)));
        assert_eq!(PropertyId::parse(" 7 "), Some(PropertyId(7)));
        assert_eq!(PropertyId::parse("-1"), None);
        assert_eq!(PropertyId::parse("12a"), None);
        assert_eq!(PropertyId::parse(""), None);
    }

    #[test]
    fn schedule_preserves_page_order() {
        let mut schedule = Schedule::new();
        schedule.insert(entry("Food Waste"));
        schedule.insert(entry("Paper & Cardboard"));
        schedule.insert(entry("Non-Recyclable Refuse"));

        let categories: Vec<&str> = schedule.entries().map(|item| item.category.as_str()).collect();
        assert_eq!(categories, ["Food Waste", "Paper & Cardboard", "Non-Recyclable Refuse"]);
    }

    #[test]
    fn collection_entry_uses_site_field_names() {
        let json = serde_json::to_value(entry("Food Waste")).expect("serializable");
        assert!(json.get("nextCollection").is_some());
        assert!(json.get("nextCollectionUTC").is_some());
        assert!(json.get("lastCollection").is_some());
        assert!(json.get("lastCollectionUTC").is_some());
        assert!(json.get("next_collection_utc").is_none());
    }

    #[test]
    fn schedule_serializes_as_plain_map() {
        let mut schedule = Schedule::new();
        schedule.insert(entry("Food Waste"));

        let json = serde_json::to_value(&schedule).expect("serializable");
        assert!(json.get("Food Waste").is_some());
        assert!(json.get("entries").is_none());
    }

    #[test]
    fn cache_entry_exposes_capture_time_in_camel_case() {
        let cached = CacheEntry {
            schedule: Schedule::new(),
            captured_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).single().expect("valid date"),
        };

        let json = serde_json::to_value(&cached).expect("serializable");
        assert!(json.get("capturedAt").is_some());
        assert!(json.get("captured_at").is_none());
    }
}
