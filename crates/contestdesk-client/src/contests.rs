//! Contest catalogue endpoints and payloads.
//!
//! # Design
//! - Payloads mirror the backend models; class levels accept integers or
//!   strings on input and always serialise as strings.
//! - Create/update payloads are validated before sending so obviously bad
//!   input never costs a round trip.

use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Years the backend accepts for a contest.
pub const YEAR_RANGE: RangeInclusive<i32> = 2000..=2100;

/// School class a contest targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawClassLevel", into = "String")]
pub enum ClassLevel {
    /// Class 9.
    Nine,
    /// Class 10.
    Ten,
    /// Class 11.
    Eleven,
    /// Class 12.
    Twelve,
    /// Anything outside the numbered classes.
    Other,
}

impl ClassLevel {
    /// Every level, in display order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [Self::Nine, Self::Ten, Self::Eleven, Self::Twelve, Self::Other]
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Eleven => "11",
            Self::Twelve => "12",
            Self::Other => "other",
        }
    }
}

impl Display for ClassLevel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

impl FromStr for ClassLevel {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|level| level.as_str() == value)
            .ok_or_else(|| ApiError::Validation {
                field: "class_level",
                reason: "must be one of 9, 10, 11, 12, other",
                value: Some(value.to_string()),
            })
    }
}

impl From<ClassLevel> for String {
    fn from(level: ClassLevel) -> Self {
        level.as_str().to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawClassLevel {
    Number(i64),
    Text(String),
}

impl TryFrom<RawClassLevel> for ClassLevel {
    type Error = ApiError;

    fn try_from(raw: RawClassLevel) -> Result<Self, Self::Error> {
        match raw {
            RawClassLevel::Number(number) => number.to_string().parse(),
            RawClassLevel::Text(text) => text.parse(),
        }
    }
}

/// Link to the solution of one contest problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Problem title.
    pub problem_name: String,
    /// Where the solution is published.
    pub solution_url: String,
}

/// Contest as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    /// Backend identifier.
    pub id: i64,
    /// Targeted class.
    pub class_level: ClassLevel,
    /// Contest year.
    pub year: i32,
    /// Display name.
    pub contest_name: String,
    /// Link to the contest statement.
    pub contest_url: String,
    /// Published solutions.
    #[serde(default)]
    pub solutions: Vec<Solution>,
}

/// Payload for creating a contest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestCreate {
    /// Targeted class.
    pub class_level: ClassLevel,
    /// Contest year.
    pub year: i32,
    /// Display name.
    pub contest_name: String,
    /// Link to the contest statement.
    pub contest_url: String,
    /// Published solutions.
    #[serde(default)]
    pub solutions: Vec<Solution>,
}

impl ContestCreate {
    /// Check the payload against the backend's constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the year is out of range.
    pub fn validate(&self) -> ApiResult<()> {
        validate_year(self.year)
    }
}

/// Partial update; unset fields are left untouched by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestUpdate {
    /// New class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_level: Option<ClassLevel>,
    /// New year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest_name: Option<String>,
    /// New contest link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest_url: Option<String>,
    /// Replacement solution list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solutions: Option<Vec<Solution>>,
}

impl ContestUpdate {
    /// Check the payload against the backend's constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when a supplied year is out of range.
    pub fn validate(&self) -> ApiResult<()> {
        self.year.map_or(Ok(()), validate_year)
    }

    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.class_level.is_none()
            && self.year.is_none()
            && self.contest_name.is_none()
            && self.contest_url.is_none()
            && self.solutions.is_none()
    }
}

fn validate_year(year: i32) -> ApiResult<()> {
    if YEAR_RANGE.contains(&year) {
        Ok(())
    } else {
        Err(ApiError::Validation {
            field: "year",
            reason: "must be between 2000 and 2100",
            value: Some(year.to_string()),
        })
    }
}

/// Contest endpoints bound to a shared [`ApiClient`].
#[derive(Clone, Copy)]
pub struct ContestsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ContestsApi<'a> {
    pub(crate) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All contests, newest year first.
    ///
    /// # Errors
    ///
    /// Propagates request and decode failures.
    pub async fn list(&self) -> ApiResult<Vec<Contest>> {
        self.client.get_json("/contests").await
    }

    /// One contest by id.
    ///
    /// # Errors
    ///
    /// Propagates request and decode failures; a missing contest is a 404
    /// [`ApiError::Status`].
    pub async fn get(&self, id: i64) -> ApiResult<Contest> {
        self.client.get_json(&format!("/contests/{id}")).await
    }

    /// Create a contest. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] before sending when the payload is
    /// invalid, otherwise propagates request and decode failures.
    pub async fn create(&self, contest: &ContestCreate) -> ApiResult<Contest> {
        contest.validate()?;
        self.client
            .send_json(Method::POST, "/contests", contest)
            .await
    }

    /// Apply a partial update. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] before sending when the payload is
    /// invalid, otherwise propagates request and decode failures.
    pub async fn update(&self, id: i64, update: &ContestUpdate) -> ApiResult<Contest> {
        update.validate()?;
        self.client
            .send_json(Method::PUT, &format!("/contests/{id}"), update)
            .await
    }

    /// Delete a contest. Requires an admin token.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&format!("/contests/{id}")).await
    }

    /// Contests for one class level.
    ///
    /// # Errors
    ///
    /// Propagates request and decode failures.
    pub async fn by_class(&self, level: ClassLevel) -> ApiResult<Vec<Contest>> {
        self.client
            .get_json(&format!("/contests/class/{level}"))
            .await
    }

    /// Contests held in one year.
    ///
    /// # Errors
    ///
    /// Propagates request and decode failures.
    pub async fn by_year(&self, year: i32) -> ApiResult<Vec<Contest>> {
        self.client.get_json(&format!("/contests/year/{year}")).await
    }
}
