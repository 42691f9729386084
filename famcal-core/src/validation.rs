//! Client-side form validation.
//!
//! Every check runs before a request is sent; failures are reported per
//! field so the CLI can show them next to the prompt that produced them.

use chrono::{Months, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::child::ChildDraft;
use crate::event::EventDraft;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));
static CHILD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}][\p{L} .'\-]*$").expect("valid name regex"));

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_SCHOOL_NAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 8;
/// One week
pub const MAX_REMINDER_MINUTES: u32 = 10_080;
pub const MAX_CHILD_AGE_YEARS: u32 = 25;

/// Field name → messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_slice()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

pub fn validate_event(draft: &EventDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.add("title", "Title is required");
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.add("title", format!("Title must be at most {MAX_TITLE_LEN} characters"));
    }

    if draft
        .description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        errors.add(
            "description",
            format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
        );
    }

    if draft
        .end_date
        .is_some_and(|end| end.to_utc() < draft.start_date.to_utc())
    {
        errors.add("endDate", "End date must be after the start date");
    }

    if !is_valid_hex_color(&draft.color) {
        errors.add("color", "Color must be a hex value like #3B82F6");
    }

    if draft.has_reminder {
        match draft.reminder_minutes {
            Some(m) if (1..=MAX_REMINDER_MINUTES).contains(&m) => {}
            _ => errors.add(
                "reminderMinutes",
                format!("Reminder must be between 1 and {MAX_REMINDER_MINUTES} minutes"),
            ),
        }
    }

    errors.into_result()
}

pub fn validate_child(draft: &ChildDraft, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = draft.name.trim();
    let name_len = name.chars().count();
    if name.is_empty() {
        errors.add("name", "Name is required");
    } else if !(2..=50).contains(&name_len) {
        errors.add("name", "Name must be between 2 and 50 characters");
    } else if !CHILD_NAME_RE.is_match(name) {
        errors.add("name", "Name may only contain letters, spaces, hyphens and apostrophes");
    }

    if draft.school_name.trim().chars().count() > MAX_SCHOOL_NAME_LEN {
        errors.add(
            "schoolName",
            format!("School name must be at most {MAX_SCHOOL_NAME_LEN} characters"),
        );
    }

    if let Some(birth) = draft.birth_date {
        if birth > today {
            errors.add("birthDate", "Birth date cannot be in the future");
        } else if today
            .checked_sub_months(Months::new(MAX_CHILD_AGE_YEARS * 12))
            .is_some_and(|earliest| birth < earliest)
        {
            errors.add(
                "birthDate",
                format!("Birth date must be within the last {MAX_CHILD_AGE_YEARS} years"),
            );
        }
    }

    errors.into_result()
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Enter a valid email address");
    }

    if password.is_empty() {
        errors.add("password", "Password is required");
    }

    errors.into_result()
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = match validate_login(email, password) {
        Ok(()) => ValidationErrors::new(),
        Err(e) => e,
    };

    if name.trim().is_empty() {
        errors.add("name", "Name is required");
    }

    if !password.is_empty() {
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        if !password.chars().any(|c| c.is_ascii_digit())
            || !password.chars().any(|c| c.is_alphabetic())
        {
            errors.add("password", "Password must contain a letter and a number");
        }
    }

    errors.into_result()
}
