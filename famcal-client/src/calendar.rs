//! Monthly calendar endpoint and view loading.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use famcal_core::Event;
use famcal_core::error::CoreError;
use famcal_core::grid::{EventsByDate, ViewMode, events_for_date, fetch_months};
use famcal_core::validation::ValidationErrors;
use reqwest::Method;
use serde::Deserialize;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Whose events a query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildFilter {
    /// Every event of the family
    #[default]
    All,
    /// The parent's own events (no child attached)
    Mine,
    Child(i64),
}

impl ChildFilter {
    /// Value of the `childId` query parameter: -1 = all, 0 = mine.
    pub fn as_param(&self) -> i64 {
        match self {
            ChildFilter::All => -1,
            ChildFilter::Mine => 0,
            ChildFilter::Child(id) => *id,
        }
    }
}

impl fmt::Display for ChildFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChildFilter::All => f.write_str("all"),
            ChildFilter::Mine => f.write_str("mine"),
            ChildFilter::Child(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ChildFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "-1" => Ok(ChildFilter::All),
            "mine" | "0" => Ok(ChildFilter::Mine),
            other => other
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .map(ChildFilter::Child)
                .ok_or_else(|| CoreError::UnknownVariant {
                    kind: "child filter",
                    value: s.to_string(),
                    expected: "all, mine or a child id".to_string(),
                }),
        }
    }
}

/// Events for one or more months: the flat list plus the server's
/// per-day index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCalendar {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub events_by_date: EventsByDate,
}

impl MonthlyCalendar {
    /// Events to show on `date`, from both sources, each once.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        events_for_date(date, &self.events, Some(&self.events_by_date))
    }

    /// Fold another month's data in. Events already present (same id) are
    /// skipped.
    pub fn merge(&mut self, other: MonthlyCalendar) {
        let mut seen: HashSet<i64> = self.events.iter().map(|e| e.id).collect();
        self.events
            .extend(other.events.into_iter().filter(|e| seen.insert(e.id)));
        self.events_by_date.merge(other.events_by_date);
    }
}

impl ApiClient {
    /// GET /calendar/monthly?year&month&childId
    pub async fn monthly_calendar(&self, year: i32, month: u32, child: ChildFilter) -> ApiResult<MonthlyCalendar> {
        if !(1..=12).contains(&month) {
            let mut errors = ValidationErrors::new();
            errors.add("month", "Month must be between 1 and 12");
            return Err(ApiError::Validation(errors));
        }

        let request = self.request(Method::GET, "/calendar/monthly", true)?.query(&[
            ("year", year.to_string()),
            ("month", month.to_string()),
            ("childId", child.as_param().to_string()),
        ]);

        let calendar: MonthlyCalendar = self.send(request).await?;
        tracing::debug!(
            year,
            month,
            events = calendar.events.len(),
            days = calendar.events_by_date.len(),
            "fetched monthly calendar"
        );
        Ok(calendar)
    }

    /// Everything a view of `reference` needs, merged across the months it
    /// touches.
    pub async fn calendar_view(
        &self,
        reference: NaiveDate,
        mode: ViewMode,
        child: ChildFilter,
    ) -> ApiResult<MonthlyCalendar> {
        let mut merged = MonthlyCalendar::default();
        for (year, month) in fetch_months(reference, mode) {
            merged.merge(self.monthly_calendar(year, month, child).await?);
        }
        Ok(merged)
    }
}
