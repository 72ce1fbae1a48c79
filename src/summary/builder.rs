use super::{Classification, SummaryError};
use crate::api::{int_to_date, Project, Task};
use chrono::NaiveDate;
use serde::Serialize;

/// The totals, date range and completion figures for one group of projects.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Summary {
    /// The earliest start date of any task in the group.
    pub start_date: Option<NaiveDate>,
    /// The latest due date of any task in the group.
    pub due_date: Option<NaiveDate>,
    /// The sum of every task's progress (each 0 to 100).
    #[serde(rename = "progress")]
    pub progress_total: u64,
    /// `progress_total` as a fraction of every task being done.
    pub progress_percent: f64,
    pub estimated_minutes: u64,
    #[serde(rename = "tasks")]
    pub task_count: u64,
    #[serde(rename = "completed")]
    pub completed_count: u64,
    pub completed_percent: f64,
    #[serde(rename = "active")]
    pub active_count: u64,
    #[serde(rename = "late")]
    pub late_count: u64,
    /// The projects that contributed tasks, if project details were asked for.
    pub projects: Vec<ProjectDescriptor>,
}

/// The details of a project recorded in a summary.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub id: u64,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub sub_status: Option<String>,
}
impl ProjectDescriptor {
    fn from_project(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            start_date: descriptor_date(project, "start", project.start_date),
            end_date: descriptor_date(project, "end", project.end_date),
            status: project.status.clone(),
            sub_status: project.sub_status.clone(),
        }
    }
}

/// A project's own dates are only shown alongside a summary, so one that isn't a real day is
/// dropped rather than failing the summary.
fn descriptor_date(project: &Project, which: &str, value: Option<u32>) -> Option<NaiveDate> {
    let value = value?;
    let date = int_to_date(value);
    if date.is_none() {
        log::warn!(
            "ignoring {which} date {value} of project `{}` ({}), it isn't a real day",
            project.name,
            project.id
        );
    }
    date
}

/// An in-progress summary, threaded through one fold step per project and then frozen with
/// [`SummaryBuilder::finalize`]. Dates are kept as `YYYYMMDD` integers until then.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBuilder {
    today: u32,
    include_projects: bool,

    start_date: Option<u32>,
    due_date: Option<u32>,
    progress_total: u64,
    estimated_minutes: u64,
    task_count: u64,
    completed_count: u64,
    active_count: u64,
    late_count: u64,
    projects: Vec<ProjectDescriptor>,
}
impl SummaryBuilder {
    /// Creates a new, empty summary. `today` (in `YYYYMMDD` form) is what lateness is judged
    /// against.
    pub fn new(today: u32, include_projects: bool) -> Self {
        Self {
            today,
            include_projects,
            start_date: None,
            due_date: None,
            progress_total: 0,
            estimated_minutes: 0,
            task_count: 0,
            completed_count: 0,
            active_count: 0,
            late_count: 0,
            projects: Vec::new(),
        }
    }

    /// Folds the tasks of one project into this summary, in the order given. Projects without
    /// any tasks leave the summary untouched (and are never recorded as contributing projects).
    pub fn fold_project(mut self, project: &Project, tasks: &[Task]) -> Result<Self, SummaryError> {
        if tasks.is_empty() {
            return Ok(self);
        }

        self.task_count += tasks.len() as u64;
        if self.include_projects {
            self.projects.push(ProjectDescriptor::from_project(project));
        }

        tasks.iter().try_fold(self, Self::fold_task)
    }

    /// Folds a single task. The running date range is widened with the task's dates *before* it
    /// is classified, so lateness is judged against the latest due date seen so far.
    fn fold_task(mut self, task: &Task) -> Result<Self, SummaryError> {
        if let Some(start) = task.start_date {
            self.start_date = Some(self.start_date.map_or(start, |s| s.min(start)));
        }
        if let Some(due) = task.due_date {
            self.due_date = Some(self.due_date.map_or(due, |d| d.max(due)));
        }

        let class = Classification::of(task, self.due_date, self.today)?;
        if class.late {
            self.late_count += 1;
        }
        if class.completed {
            self.completed_count += 1;
        } else {
            self.active_count += 1;
        }

        self.progress_total = self
            .progress_total
            .saturating_add(task.progress.unwrap_or(0));
        self.estimated_minutes = self
            .estimated_minutes
            .saturating_add(task.estimated_minutes.unwrap_or(0));

        Ok(self)
    }

    /// Freezes this summary, working out the percentages (zero for an empty summary) and
    /// converting the dates.
    pub fn finalize(self) -> Result<Summary, SummaryError> {
        let (progress_percent, completed_percent) = if self.task_count == 0 {
            (0.0, 0.0)
        } else {
            (
                self.progress_total as f64 / (self.task_count as f64 * 100.0),
                self.completed_count as f64 / self.task_count as f64,
            )
        };

        Ok(Summary {
            start_date: self.start_date.map(to_date).transpose()?,
            due_date: self.due_date.map(to_date).transpose()?,
            progress_total: self.progress_total,
            progress_percent,
            estimated_minutes: self.estimated_minutes,
            task_count: self.task_count,
            completed_count: self.completed_count,
            completed_percent,
            active_count: self.active_count,
            late_count: self.late_count,
            projects: self.projects,
        })
    }
}

fn to_date(value: u32) -> Result<NaiveDate, SummaryError> {
    int_to_date(value).ok_or(SummaryError::InvalidDate { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::fixtures::{project, task, task_due};
    use pretty_assertions::assert_eq;

    const TODAY: u32 = 20200601;

    fn fold(tasks: &[Task]) -> Summary {
        SummaryBuilder::new(TODAY, false)
            .fold_project(&project(1, "Tech Ticket A"), tasks)
            .unwrap()
            .finalize()
            .unwrap()
    }

    #[test]
    fn fresh_summary_is_default() {
        let summary = SummaryBuilder::new(TODAY, true).finalize().unwrap();
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn empty_project_is_a_no_op() {
        let builder = SummaryBuilder::new(TODAY, true);
        let folded = builder
            .clone()
            .fold_project(&project(1, "Empty"), &[])
            .unwrap();
        assert_eq!(folded, builder);
        assert!(folded.finalize().unwrap().projects.is_empty());
    }

    #[test]
    fn totals_and_percentages() {
        let mut a = task(1, "completed");
        a.progress = Some(100);
        a.estimated_minutes = Some(60);
        let mut b = task(2, "new");
        b.progress = Some(50);
        b.estimated_minutes = Some(30);
        let c = task(3, "reopened");
        let mut d = task(4, "new");
        d.progress = Some(100);

        let summary = fold(&[a, b, c, d]);
        assert_eq!(summary.task_count, 4);
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.active_count, 2);
        assert_eq!(summary.progress_total, 250);
        assert_eq!(summary.estimated_minutes, 90);
        assert_eq!(summary.progress_percent, 0.625);
        assert_eq!(summary.completed_percent, 0.5);
        assert_eq!(
            summary.completed_count + summary.active_count,
            summary.task_count
        );
    }

    #[test]
    fn date_range_spans_all_tasks() {
        let mut a = task(1, "new");
        a.start_date = Some(20200301);
        a.due_date = Some(20200401);
        let mut b = task(2, "new");
        b.start_date = Some(20200115);
        let mut c = task(3, "new");
        c.due_date = Some(20200901);

        let summary = fold(&[a, b, c]);
        assert_eq!(summary.start_date, NaiveDate::from_ymd_opt(2020, 1, 15));
        assert_eq!(summary.due_date, NaiveDate::from_ymd_opt(2020, 9, 1));
    }

    #[test]
    fn late_count_depends_on_fold_order() {
        let early = task_due(1, "new", 20200101);
        let later = task_due(2, "new", 20210101);

        // In order, the first task is judged against a past due date and the second against
        // one in the future
        assert_eq!(fold(&[early.clone(), later.clone()]).late_count, 1);
        // Reversed, the future due date is seen first and covers both
        assert_eq!(fold(&[later, early]).late_count, 0);
    }

    #[test]
    fn tasks_without_dates_are_not_late_until_a_due_date_is_seen() {
        let summary = fold(&[
            task(1, "new"),
            task_due(2, "new", 20200101),
            task(3, "new"),
        ]);
        assert_eq!(summary.late_count, 2);
    }

    #[test]
    fn projects_are_recorded_when_asked_for() {
        let mut proj = project(9, "Tech Ticket A");
        proj.start_date = Some(20200101);
        proj.status = Some("active".to_string());

        let summary = SummaryBuilder::new(TODAY, true)
            .fold_project(&proj, &[task(1, "new")])
            .unwrap()
            .fold_project(&project(10, "Empty"), &[])
            .unwrap()
            .finalize()
            .unwrap();
        assert_eq!(
            summary.projects,
            vec![ProjectDescriptor {
                id: 9,
                name: "Tech Ticket A".to_string(),
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
                end_date: None,
                status: Some("active".to_string()),
                sub_status: None,
            }]
        );

        assert!(fold(&[task(1, "new")]).projects.is_empty());
    }

    #[test]
    fn missing_status_aborts_the_fold() {
        let mut bad = task(2, "new");
        bad.status = None;
        let res = SummaryBuilder::new(TODAY, false)
            .fold_project(&project(1, "Tech"), &[task(1, "new"), bad]);
        assert!(matches!(res, Err(SummaryError::MissingStatus { task_id: 2 })));
    }

    #[test]
    fn impossible_dates_fail_finalization() {
        let res = SummaryBuilder::new(TODAY, false)
            .fold_project(&project(1, "Tech"), &[task_due(1, "new", 20201340)])
            .unwrap()
            .finalize();
        assert!(matches!(res, Err(SummaryError::InvalidDate { value: 20201340 })));
    }

    #[test]
    fn impossible_project_dates_are_dropped() {
        let mut proj = project(9, "Tech Ticket A");
        proj.start_date = Some(20201340);
        proj.end_date = Some(20201231);

        let summary = SummaryBuilder::new(TODAY, true)
            .fold_project(&proj, &[task(1, "new")])
            .unwrap()
            .finalize()
            .unwrap();
        assert_eq!(summary.task_count, 1);
        assert_eq!(summary.projects[0].start_date, None);
        assert_eq!(
            summary.projects[0].end_date,
            NaiveDate::from_ymd_opt(2020, 12, 31)
        );
    }

    #[test]
    fn oversized_figures_saturate() {
        let mut huge = task(1, "new");
        huge.progress = Some(u64::MAX);
        huge.estimated_minutes = Some(u64::MAX);
        let mut more = task(2, "new");
        more.progress = Some(50);
        more.estimated_minutes = Some(30);

        let summary = fold(&[huge, more]);
        assert_eq!(summary.progress_total, u64::MAX);
        assert_eq!(summary.estimated_minutes, u64::MAX);
        assert_eq!(summary.task_count, 2);
    }

    #[test]
    fn serializes_with_report_field_names() {
        let summary = fold(&[task_due(1, "completed", 20200101)]);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "start-date": null,
                "due-date": "2020-01-01",
                "progress": 0,
                "progress-percent": 0.0,
                "estimated-minutes": 0,
                "tasks": 1,
                "completed": 1,
                "completed-percent": 1.0,
                "active": 0,
                "late": 1,
                "projects": []
            })
        );
    }
}
