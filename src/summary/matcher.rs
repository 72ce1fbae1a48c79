use super::SummaryError;
use crate::api::NamedEntity;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Finds the entries of `catalog` whose names match any of the given patterns. Each pattern is a
/// case-insensitive regular expression anchored to the start of the name, so `tech` matches
/// `Tech Ticket Project` and an empty pattern matches everything.
///
/// Entries come back in catalog order, each at most once even if several patterns match it.
pub fn match_names(
    patterns: &[String],
    catalog: &[NamedEntity],
) -> Result<Vec<NamedEntity>, SummaryError> {
    let regexes = patterns
        .iter()
        .map(|pattern| compile(pattern))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    Ok(catalog
        .iter()
        .filter(|entity| regexes.iter().any(|re| re.is_match(&entity.name)))
        .filter(|entity| seen.insert(entity.id))
        .cloned()
        .collect())
}

fn compile(pattern: &str) -> Result<Regex, SummaryError> {
    RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(true)
        .build()
        .map_err(|source| SummaryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
