//! REST client for the famcal backend.
//!
//! `ApiClient` wraps `reqwest` with the backend's `{success, data, error}`
//! envelope and bearer-token auth. Endpoint groups live in their own
//! modules as `impl ApiClient` blocks. `SessionStore` persists the login
//! token between runs.

mod ai;
mod api;
mod auth;
pub mod calendar;
mod children;
mod envelope;
pub mod error;
mod events;
pub mod session;

pub use ai::{AnalysisResult, MAX_IMAGE_BYTES, image_mime_type};
pub use api::ApiClient;
pub use auth::AuthResponse;
pub use calendar::{ChildFilter, MonthlyCalendar};
pub use error::{ApiError, ApiResult};
pub use events::EventRange;
pub use session::{Session, SessionStore};
