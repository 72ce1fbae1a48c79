//! The records this crate reads from (and writes to) the Teamwork v1 API. Only the fields the
//! reports use are modelled, everything else in the responses is ignored.

use super::de;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A task (a "todo item" in the API's terms).
///
/// Dates are kept in the API's `YYYYMMDD` integer form so they can be compared cheaply while
/// folding; absent dates are `None`, never zero.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Task {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub project_name: Option<String>,
    /// The title of the task.
    #[serde(default)]
    pub content: Option<String>,
    /// Free-text status, in practice one of `new`, `reopened`, `completed` or `deleted`. Every
    /// task the API returns is expected to carry one.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub completed: Option<bool>,
    /// Progress from 0 to 100.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub progress: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_date")]
    pub start_date: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_date")]
    pub due_date: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub estimated_minutes: Option<u64>,
    /// Comma-separated names of the assignees.
    #[serde(default)]
    pub responsible_party_names: Option<String>,
    #[serde(default)]
    pub creator_firstname: Option<String>,
    #[serde(default)]
    pub creator_lastname: Option<String>,
}
impl Task {
    /// The full name of whoever created this task, if the API told us.
    pub fn creator(&self) -> Option<String> {
        match (&self.creator_firstname, &self.creator_lastname) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

/// A project, as listed by `projects.json` or fetched individually.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sub_status: Option<String>,
    #[serde(default, deserialize_with = "de::opt_date")]
    pub start_date: Option<u32>,
    #[serde(default, deserialize_with = "de::opt_date")]
    pub end_date: Option<u32>,
    #[serde(default)]
    pub owner: Option<Person>,
    /// The portfolio boards this project has been placed on, if the API included them.
    #[serde(default)]
    pub portfolio_boards: Vec<BoardAssociation>,
}

/// Someone referenced by another record (a project owner, for instance).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Person {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default, alias = "full-name", alias = "fullName")]
    pub name: Option<String>,
}

/// Where a project sits on a portfolio board.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardAssociation {
    #[serde(default, alias = "id", deserialize_with = "de::opt_id")]
    pub board_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub column_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub card_id: Option<u64>,
}

/// Anything that's looked up by name: tags and portfolio boards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A logged block of time on a project.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TimeEntry {
    #[serde(deserialize_with = "de::id")]
    pub id: u64,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub project_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub person_id: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub todo_item_id: Option<u64>,
    /// The ISO 8601 timestamp the entry starts at, passed through untouched.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub hours: Option<u64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub minutes: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub isbillable: Option<bool>,
}

/// The body of a request to log time against a project.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NewTimeEntry {
    pub description: String,
    pub person_id: String,
    /// `YYYYMMDD`.
    pub date: String,
    /// `HH:MM`, the time of day the work started.
    pub time: String,
    pub hours: String,
    pub minutes: String,
    pub isbillable: String,
}
impl NewTimeEntry {
    /// Creates a new time entry for the given person, starting at `start` on `date` and lasting
    /// for `duration` (anything finer than a minute is dropped).
    pub fn new(
        description: &str,
        person_id: u64,
        date: NaiveDate,
        start: NaiveTime,
        duration: Duration,
        billable: bool,
    ) -> Self {
        Self {
            description: description.to_string(),
            person_id: person_id.to_string(),
            date: date_to_int(date).to_string(),
            time: start.format("%H:%M").to_string(),
            hours: duration.num_hours().to_string(),
            minutes: (duration.num_minutes() % 60).to_string(),
            isbillable: if billable { "1" } else { "0" }.to_string(),
        }
    }
}

/// The body of a request to create a project. Unset fields are left out so the API's defaults
/// apply.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `YYYYMMDD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// `YYYYMMDD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}
impl NewProject {
    pub fn new(
        name: &str,
        description: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        company_id: Option<u64>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
            start_date: start.map(|d| date_to_int(d).to_string()),
            end_date: end.map(|d| date_to_int(d).to_string()),
            company_id: company_id.map(|id| id.to_string()),
        }
    }
}

/// Converts a date to the API's `YYYYMMDD` integer form.
pub fn date_to_int(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Converts a `YYYYMMDD` integer into a date, if it names a real day.
pub fn int_to_date(value: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt((value / 10_000) as i32, (value / 100) % 100, value % 100)
}
