use super::SummaryError;
use crate::api::Task;

/// How a single task counts towards a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the task counts as completed (if not, it's active).
    pub completed: bool,
    /// Whether the task counts as late.
    pub late: bool,
}
impl Classification {
    /// Classifies the given task. `group_due` is the latest due date seen so far in the group
    /// being summarised (including this task's own), and `today` is in `YYYYMMDD` form.
    ///
    /// A task is completed if its status starts with `complete` (case-sensitive, that's how the
    /// service reports it), if it's flagged as completed, or if its progress is exactly 100.
    ///
    /// Lateness is judged against the group's running due date rather than the task's own, so a
    /// task is late whenever the latest due date seen *up to this point* is in the past. The
    /// late count of a group therefore depends on the order its tasks are folded in.
    pub fn of(task: &Task, group_due: Option<u32>, today: u32) -> Result<Self, SummaryError> {
        let status = task
            .status
            .as_deref()
            .ok_or(SummaryError::MissingStatus { task_id: task.id })?;

        Ok(Self {
            completed: status.starts_with("complete")
                || task.completed == Some(true)
                || task.progress == Some(100),
            late: group_due.is_some_and(|due| due < today),
        })
    }
}
