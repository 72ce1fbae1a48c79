use super::{match_names, Catalog, Summary, SummaryBuilder, SummaryError};
use crate::api::{NamedEntity, Project, ProjectFilter, Service};
use serde::Serialize;

/// How to group projects into summaries. Each variant holds name patterns, which are matched
/// case-insensitively against the start of each tag/board name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelector {
    /// One summary per matching tag, over the projects carrying it.
    Tags(Vec<String>),
    /// One summary per matching portfolio board, over the projects on it.
    Portfolios(Vec<String>),
}

/// Options controlling how summaries are built.
#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    /// Today, in `YYYYMMDD` form, which lateness is judged against.
    pub today: u32,
    /// Whether to record which projects contributed to each summary.
    pub include_projects: bool,
}

/// The summary of one group (a tag or a portfolio board).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub id: u64,
    pub name: String,
    pub summary: Summary,
}

/// Produces summaries over groups of projects, fetching whatever it needs from the given
/// service. The tag and portfolio board catalogs are fetched on first use and then kept until
/// [`Summarizer::refresh_catalogs`] is called.
pub struct Summarizer<'s, S> {
    service: &'s S,
    options: SummaryOptions,
    tags: Catalog,
    boards: Catalog,
}
impl<'s, S: Service> Summarizer<'s, S> {
    pub fn new(service: &'s S, options: SummaryOptions) -> Self {
        Self {
            service,
            options,
            tags: Catalog::new("tag"),
            boards: Catalog::new("portfolio board"),
        }
    }

    /// Summarises every group the selector matches, in catalog order. Names that match nothing
    /// simply produce no groups, so an empty result is not an error.
    pub fn summarize(&mut self, selector: &GroupSelector) -> Result<Vec<GroupSummary>, SummaryError> {
        match selector {
            GroupSelector::Tags(names) => self.summarize_tags(names),
            GroupSelector::Portfolios(names) => self.summarize_portfolios(names),
        }
    }

    /// Summarises the projects carrying each tag matching the given names.
    pub fn summarize_tags(&mut self, names: &[String]) -> Result<Vec<GroupSummary>, SummaryError> {
        let service = self.service;
        let tags = match_names(names, self.tags.get_or_fetch(|| service.tags())?)?;

        tags.into_iter()
            .map(|tag| -> Result<GroupSummary, SummaryError> {
                let projects = service.list_projects(&ProjectFilter::Tags(vec![tag.id]))?;
                self.summarize_group(tag, &projects)
            })
            .collect()
    }

    /// Summarises the projects on each portfolio board matching the given names.
    pub fn summarize_portfolios(
        &mut self,
        names: &[String],
    ) -> Result<Vec<GroupSummary>, SummaryError> {
        let service = self.service;
        let boards = match_names(names, self.boards.get_or_fetch(|| service.portfolio_boards())?)?;

        boards
            .into_iter()
            .map(|board| -> Result<GroupSummary, SummaryError> {
                let projects = service.list_projects_for_board(board.id)?;
                self.summarize_group(board, &projects)
            })
            .collect()
    }

    /// Forgets the cached tag and portfolio board catalogs, so they'll be fetched again on next
    /// use.
    pub fn refresh_catalogs(&mut self) {
        self.tags.invalidate();
        self.boards.invalidate();
    }

    /// Folds every project in the group, in the order given, into a single summary.
    fn summarize_group(
        &self,
        group: NamedEntity,
        projects: &[Project],
    ) -> Result<GroupSummary, SummaryError> {
        log::info!(
            "summarizing {} projects for `{}` ({})",
            projects.len(),
            group.name,
            group.id
        );

        let builder = SummaryBuilder::new(self.options.today, self.options.include_projects);
        let summary = projects
            .iter()
            .try_fold(builder, |builder, project| -> Result<_, SummaryError> {
                let tasks = self.service.list_tasks_for_project(project.id)?;
                if !tasks.is_empty() {
                    log::info!(
                        "summarizing {} tasks for project `{}`",
                        tasks.len(),
                        project.name
                    );
                }
                builder.fold_project(project, &tasks)
            })?
            .finalize()?;

        Ok(GroupSummary {
            id: group.id,
            name: group.name,
            summary,
        })
    }
}
