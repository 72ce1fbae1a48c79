use crate::{output::Format, summary::GroupSelector};
use anyhow::{bail, Error};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::{ops::Deref, path::PathBuf, str::FromStr};

/// Teamwork reports: summaries, tasks, projects and time from Teamwork, as JSON, CSV or rows in
/// a Google Sheet.
#[derive(Parser, Debug)]
pub struct Cli {
    /// The JSON configuration file holding `TEAMWORK_DOMAIN`, `TEAMWORK_API_KEY` and, for
    /// spreadsheet output, `SPREADSHEET_ID` and `RANGE_NAME`.
    #[arg(short, long = "config")]
    pub config: PathBuf,
    /// Which format to output.
    #[arg(short, long, default_value = "json")]
    pub format: Format,
    /// A file to write JSON/CSV output to instead of stdout.
    #[arg(short, long, alias = "saveto")]
    pub output: Option<PathBuf>,
    /// A JSON file holding a Google `access_token`, for spreadsheet output. If not given, the
    /// `GOOGLE_ACCESS_TOKEN` environment variable is used.
    #[arg(long)]
    pub credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Notes on any options given that will have no effect alongside the others.
    pub fn ignored_options(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.output.is_some() && self.format == Format::Gsheet {
            ignored.push("`--output` is ignored when writing to a spreadsheet");
        }
        if let Command::Summary(summary) = &self.command {
            if summary.include_projects && self.format.is_tabular() {
                ignored.push("project details are only included in json output");
            }
        }
        ignored
    }
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// Summarises progress, estimates, completion and lateness across the projects of each
    /// matching tag or portfolio board.
    Summary(SummaryArgs),
    /// Lists every project.
    Projects,
    /// Shows Teamwork's own overview of a project.
    ProjectSummary { project_id: u64 },
    /// Creates a new project.
    CreateProject(CreateProjectArgs),
    /// Lists every task across every project, completed ones included.
    Tasks,
    /// Lists the time logged against a project.
    TimeEntries {
        project_id: u64,
        /// Only entries on or after this date.
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Only entries on or before this date.
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Only entries logged by this person.
        #[arg(long)]
        user: Option<u64>,
    },
    /// Shows a single time entry.
    TimeEntry { time_entry_id: u64 },
    /// Logs time against a project.
    LogTime(LogTimeArgs),
    /// Updates fields of a task, given as a JSON object using the API's field names (e.g.
    /// `{"content": "New title", "priority": "high"}`).
    UpdateTask {
        task_id: u64,
        #[arg(value_parser = parse_fields)]
        fields: Map<String, Value>,
    },
    /// Moves a task's due date.
    SetDue { task_id: u64, date: NaiveDate },
    /// Hands a project over to a new owner.
    SetOwner { project_id: u64, owner_id: u64 },
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    groups: GroupOptions,
    /// Include the projects behind each summary (JSON output only).
    #[arg(long)]
    pub include_projects: bool,
}
impl SummaryArgs {
    /// The groups the user asked to summarise.
    pub fn selector(&self) -> GroupSelector {
        if !self.groups.portfolios.is_empty() {
            GroupSelector::Portfolios(self.groups.portfolios.clone())
        } else {
            GroupSelector::Tags(self.groups.tags.clone())
        }
    }
}

/// Groups are selected by tag or by portfolio board, never both. Each name is a case-insensitive
/// pattern matched against the start of the tag/board name, so `""` or `".*"` matches all of
/// them.
#[derive(Args, Debug)]
#[group(multiple = false, required = true)]
struct GroupOptions {
    /// Tags to summarise the projects of, one summary per matching tag.
    #[arg(short, long = "tag", num_args = 1..)]
    tags: Vec<String>,
    /// Portfolio boards to summarise the projects of, one summary per matching board.
    #[arg(short, long = "portfolio", num_args = 1..)]
    portfolios: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LogTimeArgs {
    pub project_id: u64,
    /// The day the work was done on.
    #[arg(long)]
    pub date: NaiveDate,
    /// When the work started (e.g. `09:30`).
    #[arg(long, value_parser = parse_time)]
    pub start: NaiveTime,
    /// How long the work took (e.g. `90m`, `1h30m`, `2h`).
    #[arg(long)]
    pub duration: LoggedDuration,
    /// What the time was spent on.
    #[arg(short, long)]
    pub description: String,
    /// Who did the work. Defaults to the account the API key belongs to.
    #[arg(long)]
    pub person: Option<u64>,
    /// Marks the time as not billable.
    #[arg(long)]
    pub non_billable: bool,
}

#[derive(Args, Debug)]
pub struct CreateProjectArgs {
    pub name: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// The day the project starts.
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// The day the project is due to finish.
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// The company the project is for. Defaults to the account's own company.
    #[arg(long)]
    pub company: Option<u64>,
}

fn parse_fields(s: &str) -> Result<Map<String, Value>, Error> {
    match serde_json::from_str(s)? {
        Value::Object(fields) if !fields.is_empty() => Ok(fields),
        Value::Object(_) => bail!("no fields to update"),
        _ => bail!("invalid fields `{s}`, expected a JSON object"),
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, Error> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| anyhow::anyhow!("invalid time `{s}`, expected HH:MM"))
}

/// A wrapper over the duration of logged time, written as hours and/or minutes (`2h`, `45m`,
/// `1h30m`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedDuration(pub chrono::Duration);
impl FromStr for LoggedDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("empty duration, expected a number followed by 'h' or 'm'");
        }

        // Walk through the string, collecting digits until we hit a unit
        let mut minutes: i64 = 0;
        let mut digits = String::new();
        for c in s.chars() {
            match c {
                '0'..='9' => digits.push(c),
                'h' | 'm' if !digits.is_empty() => {
                    let n: i64 = digits.parse()?;
                    let n = if c == 'h' { n.checked_mul(60) } else { Some(n) };
                    minutes = match n.and_then(|n| minutes.checked_add(n)) {
                        Some(minutes) => minutes,
                        None => bail!("duration `{s}` is too long"),
                    };
                    digits.clear();
                }
                _ => bail!("invalid duration `{s}`, expected a number followed by 'h' or 'm'"),
            }
        }
        if !digits.is_empty() {
            bail!("invalid duration `{s}`, the last number has no 'h' or 'm' unit");
        }
        if minutes == 0 {
            bail!("duration `{s}` is zero");
        }

        match chrono::Duration::try_minutes(minutes) {
            Some(duration) => Ok(LoggedDuration(duration)),
            None => bail!("duration `{s}` is too long"),
        }
    }
}
impl Deref for LoggedDuration {
    type Target = chrono::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
