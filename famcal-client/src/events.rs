//! Event endpoints.

use chrono::NaiveDate;
use famcal_core::date::date_key;
use famcal_core::validation::validate_event;
use famcal_core::{Event, EventDraft};
use reqwest::Method;

use crate::api::ApiClient;
use crate::calendar::ChildFilter;
use crate::error::ApiResult;

/// Inclusive day range for listing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ApiClient {
    /// GET /events?startDate&endDate&childId
    pub async fn list_events(&self, range: Option<EventRange>, child: ChildFilter) -> ApiResult<Vec<Event>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(range) = range {
            query.push(("startDate", date_key(range.start)));
            query.push(("endDate", date_key(range.end)));
        }
        query.push(("childId", child.as_param().to_string()));

        let request = self.request(Method::GET, "/events", true)?.query(&query);
        self.send(request).await
    }

    /// GET /events/{id}
    pub async fn get_event(&self, id: i64) -> ApiResult<Event> {
        let request = self.request(Method::GET, &format!("/events/{id}"), true)?;
        self.send(request).await
    }

    /// POST /events
    pub async fn create_event(&self, draft: &EventDraft) -> ApiResult<Event> {
        validate_event(draft)?;

        let request = self.request(Method::POST, "/events", true)?.json(draft);
        self.send(request).await
    }

    /// PATCH /events/{id}
    pub async fn update_event(&self, id: i64, draft: &EventDraft) -> ApiResult<Event> {
        validate_event(draft)?;

        let request = self
            .request(Method::PATCH, &format!("/events/{id}"), true)?
            .json(draft);
        self.send(request).await
    }

    /// DELETE /events/{id}
    pub async fn delete_event(&self, id: i64) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &format!("/events/{id}"), true)?;
        self.send_unit(request).await
    }
}
