mod api;
mod cli;
mod config;
mod output;
mod summary;

use crate::api::*;
use crate::output::*;
use crate::summary::*;
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use serde::Serialize;
use std::{fs::File, io::Write};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();
    for note in args.ignored_options() {
        log::warn!("{note}");
    }

    let config = Config::load(&args.config)?;
    let api_key = config.api_key(std::env::var("TEAMWORK_API_KEY").ok())?;
    let client = TeamworkClient::connect(&config.domain, &api_key)
        .with_context(|| format!("failed to authenticate against {}", config.domain))?;

    let rendered = match &args.command {
        Command::Summary(summary_args) => {
            let options = SummaryOptions {
                today: date_to_int(Local::now().date_naive()),
                include_projects: summary_args.include_projects,
            };

            let selector = summary_args.selector();
            let groups = Summarizer::new(&client, options).summarize(&selector)?;
            if groups.is_empty() {
                log::warn!("nothing matched {selector:?}");
            }
            render(&groups, args.format)?
        }
        Command::Projects => render(&client.list_projects(&ProjectFilter::All)?, args.format)?,
        Command::ProjectSummary { project_id } => {
            render_value(client.project_summary(*project_id)?, args.format)
        }
        Command::CreateProject(project_args) => {
            let project = NewProject::new(
                &project_args.name,
                project_args.description.as_deref(),
                project_args.start,
                project_args.end,
                project_args.company,
            );
            let id = client.create_project(&project)?;
            return report_change(&Change {
                action: "create-project",
                id: id.unwrap_or_default(),
            });
        }
        Command::Tasks => render(&client.all_tasks()?, args.format)?,
        Command::TimeEntries {
            project_id,
            from,
            to,
            user,
        } => {
            let query = TimeEntryQuery {
                from: *from,
                to: *to,
                user_id: *user,
            };
            render(&client.project_time_entries(*project_id, &query)?, args.format)?
        }
        Command::TimeEntry { time_entry_id } => {
            render(&[client.time_entry(*time_entry_id)?], args.format)?
        }
        Command::LogTime(log_args) => {
            let entry = NewTimeEntry::new(
                &log_args.description,
                log_args.person.unwrap_or(client.account().user_id),
                log_args.date,
                log_args.start,
                *log_args.duration,
                !log_args.non_billable,
            );
            let id = client.save_time_entry(log_args.project_id, &entry)?;
            return report_change(&Change {
                action: "log-time",
                id: id.unwrap_or_default(),
            });
        }
        Command::UpdateTask { task_id, fields } => {
            client.update_task(*task_id, fields)?;
            log::info!("updated {} fields of task {task_id}", fields.len());
            return report_change(&Change {
                action: "update-task",
                id: *task_id,
            });
        }
        Command::SetDue { task_id, date } => {
            client.set_task_due_date(*task_id, *date)?;
            log::info!("moved task {task_id} to be due on {date}");
            return report_change(&Change {
                action: "set-due",
                id: *task_id,
            });
        }
        Command::SetOwner {
            project_id,
            owner_id,
        } => {
            client.set_project_owner(*project_id, *owner_id)?;
            log::info!("handed project {project_id} over to {owner_id}");
            return report_change(&Change {
                action: "set-owner",
                id: *project_id,
            });
        }
    };

    emit(rendered, &args, &config)
}

/// What a write command did, echoed to stdout so scripts can pick it up.
#[derive(Serialize)]
struct Change {
    action: &'static str,
    /// The ID of the record changed or created (0 if the API didn't say).
    id: u64,
}

fn report_change(change: &Change) -> Result<()> {
    println!("{}", serde_json::to_string(change)?);
    Ok(())
}

/// Sends rendered output wherever the user asked for it.
fn emit(rendered: Rendered, args: &Cli, config: &Config) -> Result<()> {
    match (rendered, args.format) {
        (Rendered::Rows(rows), Format::Gsheet) => {
            let token = config::google_access_token(
                args.credentials_file.as_deref(),
                std::env::var("GOOGLE_ACCESS_TOKEN").ok(),
            )?;
            let target = config.sheet_target()?;
            let cells = write_rows(&token, &target, &rows)?;
            println!("{cells} cells updated.");
            Ok(())
        }
        (rendered, _) => {
            let writer: Box<dyn Write> = match &args.output {
                Some(path) => Box::new(
                    File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?,
                ),
                None => Box::new(std::io::stdout().lock()),
            };
            match rendered {
                Rendered::Structured(value) => write_json(&value, writer),
                Rendered::Rows(rows) => write_csv(&rows, writer),
            }
        }
    }
}
