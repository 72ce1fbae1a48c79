mod client;
mod de;
mod model;

pub use client::{Account, TeamworkClient, TimeEntryQuery};
pub use model::*;

/// A failure talking to the remote service. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("[{status}] error fetching from {url}")]
    Status { status: u16, url: String },
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("response from {url} is missing `{field}`")]
    MissingField { url: String, field: &'static str },
}

/// Which projects to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    /// Only projects carrying at least one of these tags.
    Tags(Vec<u64>),
}

/// Something that can list projects.
pub trait ProjectLister {
    fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, RemoteError>;
}

/// Something that can list the tasks on a project, completed ones included.
pub trait TaskLister {
    fn list_tasks_for_project(&self, project_id: u64) -> Result<Vec<Task>, RemoteError>;
}

/// Something that can work out which projects sit on a portfolio board.
pub trait BoardResolver {
    fn list_projects_for_board(&self, board_id: u64) -> Result<Vec<Project>, RemoteError>;
}

/// Something that can list the named entities groups are selected by.
pub trait CatalogSource {
    fn tags(&self) -> Result<Vec<NamedEntity>, RemoteError>;
    fn portfolio_boards(&self) -> Result<Vec<NamedEntity>, RemoteError>;
}

/// Everything the summary engine needs from the remote service.
pub trait Service: ProjectLister + TaskLister + BoardResolver + CatalogSource {}
impl<T: ProjectLister + TaskLister + BoardResolver + CatalogSource> Service for T {}
