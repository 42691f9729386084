//! Child profile endpoints.

use chrono::Utc;
use famcal_core::validation::validate_child;
use famcal_core::{Child, ChildDraft};
use reqwest::Method;

use crate::api::ApiClient;
use crate::error::ApiResult;

impl ApiClient {
    /// GET /children
    pub async fn list_children(&self) -> ApiResult<Vec<Child>> {
        let request = self.request(Method::GET, "/children", true)?;
        self.send(request).await
    }

    /// POST /children
    pub async fn create_child(&self, draft: &ChildDraft) -> ApiResult<Child> {
        validate_child(draft, Utc::now().date_naive())?;

        let request = self.request(Method::POST, "/children", true)?.json(draft);
        self.send(request).await
    }

    /// PATCH /children/{id}
    pub async fn update_child(&self, id: i64, draft: &ChildDraft) -> ApiResult<Child> {
        validate_child(draft, Utc::now().date_naive())?;

        let request = self
            .request(Method::PATCH, &format!("/children/{id}"), true)?
            .json(draft);
        self.send(request).await
    }

    /// DELETE /children/{id}
    pub async fn delete_child(&self, id: i64) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &format!("/children/{id}"), true)?;
        self.send_unit(request).await
    }
}
