//! Core types for famcal.
//!
//! This crate is shared by the REST client and the CLI:
//! - `event`, `child` and `user` model what the backend stores
//! - `grid` is the calendar grid engine (cells, per-day buckets, navigation, overlap layout)
//! - `validation` holds the client-side form checks
//! - `config` loads ~/.config/famcal/config.toml

pub mod child;
pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod grid;
pub mod user;
pub mod validation;

pub use child::{Child, ChildDraft, GradeLevel};
pub use error::{CoreError, CoreResult};
pub use event::{ChildRef, Event, EventDraft, EventTime, EventType, Priority};
pub use user::User;
