use super::{
    de, BoardResolver, CatalogSource, NamedEntity, NewProject, NewTimeEntry, Project,
    ProjectFilter, ProjectLister, RemoteError, Task, TaskLister, TimeEntry,
};
use base64::Engine;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use ureq::{http::Response, Agent, Body};

/// The number of records to ask for on each page of a paginated listing.
const PAGE_SIZE: u32 = 250;

/// The account the API key belongs to, as reported by `authenticate.json`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(deserialize_with = "de::id")]
    pub user_id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Optional filters on a project's time entries.
#[derive(Debug, Clone, Default)]
pub struct TimeEntryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub user_id: Option<u64>,
}
impl TimeEntryQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = self.from {
            params.push(("fromdate", from.format("%Y%m%d").to_string()));
        }
        if let Some(to) = self.to {
            params.push(("todate", to.format("%Y%m%d").to_string()));
        }
        if let Some(user_id) = self.user_id {
            params.push(("userId", user_id.to_string()));
        }
        params
    }
}

/// A blocking client for the Teamwork v1 API, authenticated with an API key.
///
/// Every call is synchronous and sequential, and nothing is retried: a non-success status is
/// surfaced immediately as a [`RemoteError`].
pub struct TeamworkClient {
    agent: Agent,
    base_url: String,
    auth: String,
    account: Account,
}
impl TeamworkClient {
    /// Connects to the given Teamwork domain (e.g. `acme.teamwork.com`), checking the API key by
    /// fetching the account it belongs to.
    pub fn connect(domain: &str, api_key: &str) -> Result<Self, RemoteError> {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        let mut client = Self {
            agent,
            base_url: base_url(domain),
            auth: basic_auth(api_key),
            account: Account {
                user_id: 0,
                name: None,
            },
        };

        let envelope: AccountEnvelope = client.get("authenticate.json", &[])?;
        log::debug!(
            "authenticated as user {} against {}",
            envelope.account.user_id,
            client.base_url
        );
        client.account = envelope.account;
        Ok(client)
    }

    /// The account we authenticated as.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Fetches a single project.
    pub fn project(&self, project_id: u64) -> Result<Project, RemoteError> {
        let envelope: ProjectEnvelope = self.get(&format!("projects/{project_id}.json"), &[])?;
        Ok(envelope.project)
    }

    /// Fetches the API's own overview of a project (task, milestone and time counts). Its shape
    /// isn't modelled, so it's handed back as-is.
    pub fn project_summary(&self, project_id: u64) -> Result<Value, RemoteError> {
        let envelope: ProjectSummaryEnvelope =
            self.get(&format!("projects/{project_id}/summary.json"), &[])?;
        Ok(envelope.summary)
    }

    /// Creates a project, returning its ID if the API reported one.
    pub fn create_project(&self, project: &NewProject) -> Result<Option<u64>, RemoteError> {
        let created: ProjectCreated =
            self.send(Method::Post, "projects.json", &json!({ "project": project }))?;
        Ok(created.id)
    }

    /// Lists every task across every project the account can see, completed ones included.
    pub fn all_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.get_paged(
            "tasks.json",
            &[("includeCompletedTasks", "true".to_string())],
            |envelope: TodoItemsEnvelope| envelope.todo_items,
        )
    }

    /// Lists the time entries on a project.
    pub fn project_time_entries(
        &self,
        project_id: u64,
        query: &TimeEntryQuery,
    ) -> Result<Vec<TimeEntry>, RemoteError> {
        let envelope: TimeEntriesEnvelope = self.get(
            &format!("projects/{project_id}/time_entries.json"),
            &query.params(),
        )?;
        Ok(envelope.time_entries)
    }

    /// Fetches a single time entry.
    pub fn time_entry(&self, time_entry_id: u64) -> Result<TimeEntry, RemoteError> {
        let envelope: TimeEntryEnvelope =
            self.get(&format!("time_entries/{time_entry_id}.json"), &[])?;
        Ok(envelope.time_entry)
    }

    /// Logs time against a project, returning the ID of the new entry if the API reported one.
    pub fn save_time_entry(
        &self,
        project_id: u64,
        entry: &NewTimeEntry,
    ) -> Result<Option<u64>, RemoteError> {
        let created: TimeLogCreated = self.send(
            Method::Post,
            &format!("projects/{project_id}/time_entries.json"),
            &json!({ "time-entry": entry }),
        )?;
        Ok(created.time_log_id)
    }

    /// Updates the given fields of a task, named as the API names them (e.g. `content`,
    /// `due-date`, `priority`). Fields not given are left alone.
    pub fn update_task(&self, task_id: u64, fields: &Map<String, Value>) -> Result<(), RemoteError> {
        self.send::<Value>(
            Method::Put,
            &format!("tasks/{task_id}.json"),
            &json!({ "todo-item": fields }),
        )?;
        Ok(())
    }

    /// Moves a task's due date.
    pub fn set_task_due_date(&self, task_id: u64, due: NaiveDate) -> Result<(), RemoteError> {
        self.update_task(task_id, &due_date_fields(due))
    }

    /// Hands a project over to a new owner.
    pub fn set_project_owner(&self, project_id: u64, owner_id: u64) -> Result<(), RemoteError> {
        self.send::<Value>(
            Method::Put,
            &format!("projects/{project_id}.json"),
            &owner_body(owner_id),
        )?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Performs a GET, returning the raw response if it succeeded.
    fn call(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(String, Response<Body>), RemoteError> {
        let url = self.url(path);
        log::debug!("GET {url}");
        let mut req = self.agent.get(&url).header("Authorization", self.auth.as_str());
        for (key, value) in query {
            req = req.query(*key, value.as_str());
        }
        let res = req.call().map_err(|source| RemoteError::Transport {
            url: url.clone(),
            source,
        })?;
        if res.status() != 200 {
            return Err(RemoteError::Status {
                status: res.status().as_u16(),
                url,
            });
        }

        Ok((url, res))
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let (url, mut res) = self.call(path, query)?;
        res.body_mut()
            .read_json()
            .map_err(|source| RemoteError::Decode { url, source })
    }

    /// Fetches every page of a paginated listing, using the `X-Pages` header to know when to
    /// stop (a missing header means there's only one page).
    fn get_paged<E, T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        extract: impl Fn(E) -> Vec<T>,
    ) -> Result<Vec<T>, RemoteError>
    where
        E: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let mut paged_query = query.to_vec();
            paged_query.push(("page", page.to_string()));
            paged_query.push(("pageSize", PAGE_SIZE.to_string()));

            let (url, mut res) = self.call(path, &paged_query)?;
            let pages = res
                .headers()
                .get("X-Pages")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(1);
            let envelope: E = res
                .body_mut()
                .read_json()
                .map_err(|source| RemoteError::Decode { url, source })?;
            items.extend(extract(envelope));

            if page >= pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Sends a JSON body with a PUT or POST, expecting the status the API uses for that verb.
    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, RemoteError> {
        let url = self.url(path);
        log::debug!("{method:?} {url}");
        let res = match method {
            Method::Put => self.agent.put(&url),
            Method::Post => self.agent.post(&url),
        }
        .header("Authorization", self.auth.as_str())
        .send_json(body);
        let mut res = res.map_err(|source| RemoteError::Transport {
            url: url.clone(),
            source,
        })?;
        if res.status() != method.success_status() {
            return Err(RemoteError::Status {
                status: res.status().as_u16(),
                url,
            });
        }

        res.body_mut()
            .read_json()
            .map_err(|source| RemoteError::Decode { url, source })
    }
}
impl ProjectLister for TeamworkClient {
    fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, RemoteError> {
        let query = match filter {
            ProjectFilter::All => Vec::new(),
            ProjectFilter::Tags(ids) => vec![(
                "projectTagIds",
                ids.iter().map(u64::to_string).collect::<Vec<_>>().join(","),
            )],
        };
        self.get_paged("projects.json", &query, |envelope: ProjectsEnvelope| {
            envelope.projects
        })
    }
}
impl TaskLister for TeamworkClient {
    fn list_tasks_for_project(&self, project_id: u64) -> Result<Vec<Task>, RemoteError> {
        self.get_paged(
            &format!("projects/{project_id}/tasks.json"),
            &[
                ("includeCompletedTasks", "true".to_string()),
                ("includeCompletedSubtasks", "true".to_string()),
            ],
            |envelope: TodoItemsEnvelope| envelope.todo_items,
        )
    }
}
impl BoardResolver for TeamworkClient {
    /// Boards don't list their projects directly: each board has columns, each column has
    /// cards, and each card points at a project. Cards only carry the project's ID, so every
    /// project is fetched in full.
    fn list_projects_for_board(&self, board_id: u64) -> Result<Vec<Project>, RemoteError> {
        let columns: ColumnsEnvelope =
            self.get(&format!("portfolio/boards/{board_id}/columns.json"), &[])?;

        let mut projects = Vec::new();
        for column in columns.columns {
            let path = format!("portfolio/columns/{}/cards.json", column.id);
            let cards: CardsEnvelope = self.get(&path, &[])?;
            for card in cards.cards {
                let project_id = card.project_id.ok_or_else(|| RemoteError::MissingField {
                    url: self.url(&path),
                    field: "projectId",
                })?;
                projects.push(self.project(project_id)?);
            }
        }

        Ok(projects)
    }
}
impl CatalogSource for TeamworkClient {
    fn tags(&self) -> Result<Vec<NamedEntity>, RemoteError> {
        let envelope: TagsEnvelope = self.get("tags.json", &[])?;
        Ok(envelope.tags)
    }

    fn portfolio_boards(&self) -> Result<Vec<NamedEntity>, RemoteError> {
        let envelope: BoardsEnvelope = self.get("portfolio/boards.json", &[])?;
        Ok(envelope.boards)
    }
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Put,
    Post,
}
impl Method {
    /// Creation answers `201 Created`, updates a plain `200`.
    fn success_status(self) -> u16 {
        match self {
            Self::Put => 200,
            Self::Post => 201,
        }
    }
}

/// Builds the API's base URL from a domain, tolerating one that already has a scheme.
fn base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// The API takes the key as a basic-auth user name with an empty password.
fn basic_auth(api_key: &str) -> String {
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{api_key}:"))
    )
}

fn due_date_fields(due: NaiveDate) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("due-date".to_string(), due.format("%Y%m%d").to_string().into());
    fields
}

fn owner_body(owner_id: u64) -> Value {
    json!({ "project": { "projectOwnerId": owner_id } })
}

// --- Response envelopes ---

#[derive(Deserialize)]
struct AccountEnvelope {
    account: Account,
}

#[derive(Deserialize)]
struct ProjectsEnvelope {
    #[serde(default)]
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

#[derive(Deserialize)]
struct TodoItemsEnvelope {
    #[serde(rename = "todo-items", default)]
    todo_items: Vec<Task>,
}

#[derive(Deserialize)]
struct TagsEnvelope {
    #[serde(default)]
    tags: Vec<NamedEntity>,
}

#[derive(Deserialize)]
struct BoardsEnvelope {
    #[serde(default)]
    boards: Vec<NamedEntity>,
}

#[derive(Deserialize)]
struct ColumnsEnvelope {
    #[serde(default)]
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct Column {
    #[serde(deserialize_with = "de::id")]
    id: u64,
}

#[derive(Deserialize)]
struct CardsEnvelope {
    #[serde(default)]
    cards: Vec<Card>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Card {
    #[serde(default, deserialize_with = "de::opt_id")]
    project_id: Option<u64>,
}

#[derive(Deserialize)]
struct TimeEntriesEnvelope {
    #[serde(rename = "time-entries", default)]
    time_entries: Vec<TimeEntry>,
}

#[derive(Deserialize)]
struct TimeEntryEnvelope {
    #[serde(rename = "time-entry")]
    time_entry: TimeEntry,
}

#[derive(Deserialize)]
struct ProjectSummaryEnvelope {
    #[serde(default)]
    summary: Value,
}

#[derive(Deserialize)]
struct ProjectCreated {
    #[serde(default, deserialize_with = "de::opt_id")]
    id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeLogCreated {
    #[serde(default, deserialize_with = "de::opt_id")]
    time_log_id: Option<u64>,
}
