mod aggregate;
mod builder;
mod catalog;
mod classify;
mod matcher;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::api::RemoteError;

pub use aggregate::{GroupSelector, GroupSummary, Summarizer, SummaryOptions};
pub use builder::{ProjectDescriptor, Summary, SummaryBuilder};
pub use catalog::Catalog;
pub use classify::Classification;
pub use matcher::match_names;

/// Anything that can stop a summary from being produced. A failure anywhere in a group discards
/// that group's summary entirely.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("task {task_id} has no status")]
    MissingStatus { task_id: u64 },
    #[error("invalid name pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("`{value}` is not a valid YYYYMMDD date")]
    InvalidDate { value: u32 },
}
