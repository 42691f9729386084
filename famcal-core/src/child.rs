//! Child profiles.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A child profile managed by the parent account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: i64,
    pub name: String,
    pub grade_level: GradeLevel,
    #[serde(default, deserialize_with = "crate::event::null_as_default")]
    pub school_name: String,
    #[serde(default, with = "crate::date::optional_day")]
    pub birth_date: Option<NaiveDate>,
}

impl Child {
    /// Age in whole years on `today`, if the birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    pub fn to_draft(&self) -> ChildDraft {
        ChildDraft {
            name: self.name.clone(),
            grade_level: self.grade_level,
            school_name: self.school_name.clone(),
            birth_date: self.birth_date,
        }
    }
}

impl fmt::Display for Child {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Child fields as sent on create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildDraft {
    pub name: String,
    pub grade_level: GradeLevel,
    pub school_name: String,
    #[serde(default, with = "crate::date::optional_day")]
    pub birth_date: Option<NaiveDate>,
}

/// School grade, Pre-K through 12th grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeLevel {
    #[serde(rename = "Pre-K")]
    PreK,
    Kindergarten,
    #[serde(rename = "1st Grade")]
    First,
    #[serde(rename = "2nd Grade")]
    Second,
    #[serde(rename = "3rd Grade")]
    Third,
    #[serde(rename = "4th Grade")]
    Fourth,
    #[serde(rename = "5th Grade")]
    Fifth,
    #[serde(rename = "6th Grade")]
    Sixth,
    #[serde(rename = "7th Grade")]
    Seventh,
    #[serde(rename = "8th Grade")]
    Eighth,
    #[serde(rename = "9th Grade")]
    Ninth,
    #[serde(rename = "10th Grade")]
    Tenth,
    #[serde(rename = "11th Grade")]
    Eleventh,
    #[serde(rename = "12th Grade")]
    Twelfth,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 14] = [
        GradeLevel::PreK,
        GradeLevel::Kindergarten,
        GradeLevel::First,
        GradeLevel::Second,
        GradeLevel::Third,
        GradeLevel::Fourth,
        GradeLevel::Fifth,
        GradeLevel::Sixth,
        GradeLevel::Seventh,
        GradeLevel::Eighth,
        GradeLevel::Ninth,
        GradeLevel::Tenth,
        GradeLevel::Eleventh,
        GradeLevel::Twelfth,
    ];

    /// Wire/display label, e.g. "3rd Grade".
    pub fn label(&self) -> &'static str {
        match self {
            GradeLevel::PreK => "Pre-K",
            GradeLevel::Kindergarten => "Kindergarten",
            GradeLevel::First => "1st Grade",
            GradeLevel::Second => "2nd Grade",
            GradeLevel::Third => "3rd Grade",
            GradeLevel::Fourth => "4th Grade",
            GradeLevel::Fifth => "5th Grade",
            GradeLevel::Sixth => "6th Grade",
            GradeLevel::Seventh => "7th Grade",
            GradeLevel::Eighth => "8th Grade",
            GradeLevel::Ninth => "9th Grade",
            GradeLevel::Tenth => "10th Grade",
            GradeLevel::Eleventh => "11th Grade",
            GradeLevel::Twelfth => "12th Grade",
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GradeLevel {
    type Err = CoreError;

    /// Accepts the label ("3rd Grade"), a bare number ("3"), "k" or "prek".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        let by_shorthand = match needle.as_str() {
            "pre-k" | "prek" | "pk" => Some(GradeLevel::PreK),
            "k" | "kindergarten" => Some(GradeLevel::Kindergarten),
            n => n
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=12).contains(n))
                .map(|n| GradeLevel::ALL[n + 1]),
        };

        by_shorthand
            .or_else(|| {
                GradeLevel::ALL
                    .into_iter()
                    .find(|g| g.label().to_ascii_lowercase() == needle)
            })
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "grade level",
                value: s.to_string(),
                expected: GradeLevel::ALL.map(|g| g.label()).join(", "),
            })
    }
}
