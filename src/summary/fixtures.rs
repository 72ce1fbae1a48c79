//! Builders for test records and an in-memory stand-in for the remote service.

use crate::api::{
    BoardResolver, CatalogSource, NamedEntity, Project, ProjectFilter, ProjectLister,
    RemoteError, Task, TaskLister,
};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

pub fn entity(id: u64, name: &str) -> NamedEntity {
    NamedEntity {
        id,
        name: name.to_string(),
    }
}

pub fn task(id: u64, status: &str) -> Task {
    Task {
        id,
        status: Some(status.to_string()),
        ..Task::default()
    }
}

pub fn task_due(id: u64, status: &str, due: u32) -> Task {
    Task {
        due_date: Some(due),
        ..task(id, status)
    }
}

pub fn project(id: u64, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        ..Project::default()
    }
}

/// A fake service holding everything in memory. Projects or boards not registered come back
/// empty, and tasks for an unknown project are a remote error, as they would be from the API.
#[derive(Default)]
pub struct FakeService {
    pub tags: Vec<NamedEntity>,
    pub boards: Vec<NamedEntity>,
    pub projects_by_tag: HashMap<u64, Vec<Project>>,
    pub projects_by_board: HashMap<u64, Vec<Project>>,
    pub tasks: HashMap<u64, Vec<Task>>,
    pub tag_fetches: Cell<u32>,
    pub board_fetches: Cell<u32>,
    /// Every project filter asked for, in order.
    pub project_queries: RefCell<Vec<ProjectFilter>>,
}
impl FakeService {
    pub fn with_project(mut self, project: Project, tasks: Vec<Task>) -> Self {
        self.tasks.insert(project.id, tasks);
        self
    }
}
impl ProjectLister for FakeService {
    fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, RemoteError> {
        self.project_queries.borrow_mut().push(filter.clone());
        Ok(match filter {
            ProjectFilter::All => self.projects_by_tag.values().flatten().cloned().collect(),
            ProjectFilter::Tags(ids) => ids
                .iter()
                .flat_map(|id| self.projects_by_tag.get(id).cloned().unwrap_or_default())
                .collect(),
        })
    }
}
impl TaskLister for FakeService {
    fn list_tasks_for_project(&self, project_id: u64) -> Result<Vec<Task>, RemoteError> {
        self.tasks
            .get(&project_id)
            .cloned()
            .ok_or_else(|| RemoteError::Status {
                status: 404,
                url: format!("https://fake.teamwork.com/projects/{project_id}/tasks.json"),
            })
    }
}
impl BoardResolver for FakeService {
    fn list_projects_for_board(&self, board_id: u64) -> Result<Vec<Project>, RemoteError> {
        Ok(self
            .projects_by_board
            .get(&board_id)
            .cloned()
            .unwrap_or_default())
    }
}
impl CatalogSource for FakeService {
    fn tags(&self) -> Result<Vec<NamedEntity>, RemoteError> {
        self.tag_fetches.set(self.tag_fetches.get() + 1);
        Ok(self.tags.clone())
    }

    fn portfolio_boards(&self) -> Result<Vec<NamedEntity>, RemoteError> {
        self.board_fetches.set(self.board_fetches.get() + 1);
        Ok(self.boards.clone())
    }
}
