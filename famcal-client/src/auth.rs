//! Login, registration and the current user.

use famcal_core::User;
use famcal_core::validation::{validate_login, validate_registration};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::session::Session;

/// Payload of a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Session::new(auth.token, Some(auth.user))
    }
}

impl ApiClient {
    /// POST /auth/login
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        validate_login(email, password)?;

        let request = self
            .request(Method::POST, "/auth/login", false)?
            .json(&json!({ "email": email.trim(), "password": password }));

        self.send(request).await
    }

    /// POST /auth/register
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthResponse> {
        validate_registration(name, email, password)?;

        let request = self.request(Method::POST, "/auth/register", false)?.json(&json!({
            "name": name.trim(),
            "email": email.trim(),
            "password": password,
        }));

        self.send(request).await
    }

    /// GET /auth/me
    pub async fn current_user(&self) -> ApiResult<User> {
        let request = self.request(Method::GET, "/auth/me", true)?;
        self.send(request).await
    }
}
