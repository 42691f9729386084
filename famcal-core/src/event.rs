//! Calendar event types.
//!
//! The backend owns events; the client only holds copies for display and
//! for edit forms. Dates are validated while decoding, so an `Event` in
//! hand always has a usable start.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::date::{ParsedDate, date_key, parse_iso};
use crate::error::{CoreError, CoreResult};

/// A calendar event as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<EventTime>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_all_day: bool,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: EventType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// `None` for family-wide events
    #[serde(default)]
    pub child_id: Option<i64>,
    /// Children attached to the event (multi-child events)
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_reminder: bool,
    #[serde(default)]
    pub reminder_minutes: Option<u32>,
}

/// Decode an explicit `null` like a missing key.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// A child reference embedded in an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: i64,
    pub name: String,
}

/// Start or end of an event: an instant or a whole day.
///
/// Serialized as an RFC 3339 string (`2025-03-05T10:00:00Z`) or `YYYY-MM-DD`.
/// Anything else fails to deserialize with `CoreError::InvalidDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn parse(s: &str) -> CoreResult<Self> {
        Ok(match parse_iso(s)? {
            ParsedDate::Instant(dt) => EventTime::DateTime(dt),
            ParsedDate::Day(d) => EventTime::Date(d),
        })
    }

    /// Calendar date in the UTC frame.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::DateTime(dt) => dt.date_naive(),
            EventTime::Date(d) => *d,
        }
    }

    /// Instant of this time; whole days start at midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }
}

impl TryFrom<String> for EventTime {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        EventTime::parse(&s)
    }
}

impl From<EventTime> for String {
    fn from(t: EventTime) -> Self {
        t.to_string()
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::DateTime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            EventTime::Date(d) => write!(f, "{}", date_key(*d)),
        }
    }
}

/// Default length of a timed event that has no end.
pub const DEFAULT_EVENT_DURATION_MINUTES: i64 = 60;

impl Event {
    /// Calendar day (UTC) the event starts on; this is its bucket.
    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date()
    }

    /// Whether the event occupies a time slot (as opposed to an all-day band).
    pub fn is_timed(&self) -> bool {
        !self.is_all_day && matches!(self.start_date, EventTime::DateTime(_))
    }

    /// Start and end instants of a timed event. A missing or inverted end
    /// falls back to `DEFAULT_EVENT_DURATION_MINUTES`.
    pub fn time_span(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_date.to_utc();
        let fallback = start + Duration::minutes(DEFAULT_EVENT_DURATION_MINUTES);
        let end = match self.end_date {
            Some(EventTime::DateTime(end)) if end > start => end,
            _ => fallback,
        };
        (start, end)
    }

    /// Editable copy of this event for an update form.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            is_all_day: self.is_all_day,
            kind: self.kind,
            priority: self.priority,
            color: self.color.clone(),
            child_id: self.child_id,
            has_reminder: self.has_reminder,
            reminder_minutes: self.reminder_minutes,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Event fields as sent on create/update, and as proposed by AI analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<EventTime>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_all_day: bool,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: EventType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default)]
    pub child_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_reminder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_minutes: Option<u32>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, start_date: EventTime) -> Self {
        let kind = EventType::default();
        EventDraft {
            title: title.into(),
            description: None,
            start_date,
            end_date: None,
            is_all_day: matches!(start_date, EventTime::Date(_)),
            kind,
            priority: Priority::default(),
            color: kind.default_color().to_string(),
            child_id: None,
            has_reminder: false,
            reminder_minutes: None,
        }
    }

    /// Fill in the type's color when none was chosen.
    pub fn with_default_color(mut self) -> Self {
        if self.color.trim().is_empty() {
            self.color = self.kind.default_color().to_string();
        }
        self
    }
}

/// The ten event categories the backend knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    School,
    Sports,
    Medical,
    Birthday,
    Appointment,
    Activity,
    Playdate,
    Holiday,
    Reminder,
    #[default]
    #[serde(other)]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 10] = [
        EventType::School,
        EventType::Sports,
        EventType::Medical,
        EventType::Birthday,
        EventType::Appointment,
        EventType::Activity,
        EventType::Playdate,
        EventType::Holiday,
        EventType::Reminder,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::School => "school",
            EventType::Sports => "sports",
            EventType::Medical => "medical",
            EventType::Birthday => "birthday",
            EventType::Appointment => "appointment",
            EventType::Activity => "activity",
            EventType::Playdate => "playdate",
            EventType::Holiday => "holiday",
            EventType::Reminder => "reminder",
            EventType::Other => "other",
        }
    }

    /// Color preselected in the event form for this type.
    pub fn default_color(&self) -> &'static str {
        match self {
            EventType::School => "#3B82F6",
            EventType::Sports => "#10B981",
            EventType::Medical => "#EF4444",
            EventType::Birthday => "#EC4899",
            EventType::Appointment => "#8B5CF6",
            EventType::Activity => "#F59E0B",
            EventType::Playdate => "#14B8A6",
            EventType::Holiday => "#F97316",
            EventType::Reminder => "#6366F1",
            EventType::Other => "#6B7280",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "event type",
                value: s.to_string(),
                expected: EventType::ALL.map(|t| t.as_str()).join(", "),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
                expected: Priority::ALL.map(|p| p.as_str()).join(", "),
            })
    }
}
