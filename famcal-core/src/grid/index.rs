//! Per-day event buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::date::date_key;
use crate::event::Event;

/// Events bucketed by the calendar day they start on.
///
/// On the wire this is the `eventsByDate` object of the monthly calendar
/// response: `{"2025-03-05": [Event, ...], ...}`. Keys that are not valid
/// `YYYY-MM-DD` dates fail to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventsByDate(BTreeMap<NaiveDate, Vec<Event>>);

impl EventsByDate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket events by start day, keeping input order within a day.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut index = Self::new();
        for event in events {
            index.insert(event.clone());
        }
        index
    }

    /// Add an event to its start day. An event already present under that
    /// day (same id) is left where it is.
    pub fn insert(&mut self, event: Event) {
        let bucket = self.0.entry(event.start_day()).or_default();
        if !bucket.iter().any(|e| e.id == event.id) {
            bucket.push(event);
        }
    }

    /// Fold another index into this one, keeping its day keys and
    /// deduplicating per day.
    pub fn merge(&mut self, other: EventsByDate) {
        for (date, events) in other.0 {
            let bucket = self.0.entry(date).or_default();
            for event in events {
                if !bucket.iter().any(|e| e.id == event.id) {
                    bucket.push(event);
                }
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> &[Event] {
        self.0.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of days with at least one bucket entry.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Events to show on `date`.
///
/// Takes the pre-bucketed server entries for the day first, then every
/// event of the flat list that starts on `date`, and drops repeated ids
/// (first occurrence wins).
pub fn events_for_date<'a>(
    date: NaiveDate,
    events: &'a [Event],
    events_by_date: Option<&'a EventsByDate>,
) -> Vec<&'a Event> {
    let bucket = events_by_date.map(|index| index.get(date)).unwrap_or(&[]);
    let mut seen = HashSet::new();

    let merged: Vec<&Event> = bucket
        .iter()
        .chain(events.iter().filter(|e| e.start_day() == date))
        .filter(|e| seen.insert(e.id))
        .collect();

    tracing::trace!(
        key = %date_key(date),
        indexed = bucket.len(),
        merged = merged.len(),
        "events for date"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, EventType, Priority};

    fn event(id: i64, start: &str) -> Event {
        Event {
            id,
            title: format!("event {id}"),
            description: None,
            start_date: EventTime::parse(start).unwrap(),
            end_date: None,
            is_all_day: false,
            kind: EventType::Other,
            priority: Priority::Medium,
            color: "#6B7280".into(),
            child_id: None,
            children: vec![],
            has_reminder: false,
            reminder_minutes: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        crate::date::parse_day(s).unwrap()
    }

    #[test]
    fn event_in_both_sources_appears_once() {
        let shared = event(1, "2025-03-05T10:00:00Z");
        let index = EventsByDate::from_events([&shared]);
        let flat = vec![shared.clone()];

        assert_eq!(index.get(day("2025-03-05")).len(), 1);

        let result = events_for_date(day("2025-03-05"), &flat, Some(&index));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn union_of_both_sources_with_server_first() {
        let from_server = event(1, "2025-03-05T08:00:00Z");
        let both = event(2, "2025-03-05T09:00:00Z");
        let local_only = event(3, "2025-03-05");
        let other_day = event(4, "2025-03-06T09:00:00Z");

        let index = EventsByDate::from_events([&from_server, &both]);
        let flat = vec![local_only.clone(), both.clone(), other_day];

        let ids: Vec<i64> = events_for_date(day("2025-03-05"), &flat, Some(&index))
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn works_without_an_index() {
        let flat = vec![event(1, "2025-03-05T23:59:59Z"), event(2, "2025-03-06T00:00:00Z")];
        let result = events_for_date(day("2025-03-05"), &flat, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn decodes_events_by_date_object() {
        let json = serde_json::json!({
            "2025-03-05": [{
                "id": 9,
                "title": "Book fair",
                "startDate": "2025-03-05T15:00:00Z",
                "type": "school"
            }]
        });
        let index: EventsByDate = serde_json::from_value(json).unwrap();
        assert_eq!(index.get(day("2025-03-05"))[0].title, "Book fair");
        assert!(index.get(day("2025-03-04")).is_empty());
    }

    #[test]
    fn rejects_malformed_keys() {
        let json = serde_json::json!({ "March 5": [] });
        assert!(serde_json::from_value::<EventsByDate>(json).is_err());
    }

    #[test]
    fn merge_deduplicates_per_day() {
        let a = event(1, "2025-03-05T10:00:00Z");
        let b = event(2, "2025-03-31T10:00:00Z");
        let mut march = EventsByDate::from_events([&a]);
        march.merge(EventsByDate::from_events([&a, &b]));

        assert_eq!(march.len(), 2);
        assert_eq!(march.get(day("2025-03-05")).len(), 1);
    }
}
