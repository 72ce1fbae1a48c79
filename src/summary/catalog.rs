use crate::api::{NamedEntity, RemoteError};

/// A lazily-populated list of named entities (tags or portfolio boards). The list is fetched the
/// first time it's needed and reused until [`Catalog::invalidate`] is called.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// What this catalog holds, for logging.
    label: &'static str,
    state: CatalogState,
}

#[derive(Debug, Clone, PartialEq)]
enum CatalogState {
    Unpopulated,
    Populated(Vec<NamedEntity>),
}

impl Catalog {
    /// Creates a new, empty catalog.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            state: CatalogState::Unpopulated,
        }
    }

    /// Whether or not the catalog has been fetched.
    pub fn is_populated(&self) -> bool {
        matches!(self.state, CatalogState::Populated(_))
    }

    /// Returns the catalog's entries, calling `fetch` to populate it if this is the first use
    /// since creation or invalidation. A failed fetch leaves the catalog unpopulated.
    pub fn get_or_fetch<F>(&mut self, fetch: F) -> Result<&[NamedEntity], RemoteError>
    where
        F: FnOnce() -> Result<Vec<NamedEntity>, RemoteError>,
    {
        if !self.is_populated() {
            let entries = fetch()?;
            log::debug!("populated {} catalog with {} entries", self.label, entries.len());
            self.state = CatalogState::Populated(entries);
        }

        match &self.state {
            CatalogState::Populated(entries) => Ok(entries.as_slice()),
            CatalogState::Unpopulated => Ok(&[]),
        }
    }

    /// Forgets the cached entries, so the next use fetches them again.
    pub fn invalidate(&mut self) {
        self.state = CatalogState::Unpopulated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::fixtures::entity;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn fetches_once_until_invalidated() {
        let fetches = Cell::new(0);
        let fetch = || -> Result<Vec<NamedEntity>, RemoteError> {
            fetches.set(fetches.get() + 1);
            Ok(vec![entity(1, "Tech")])
        };
        let mut catalog = Catalog::new("tag");
        assert!(!catalog.is_populated());

        assert_eq!(catalog.get_or_fetch(fetch).unwrap(), &[entity(1, "Tech")]);
        assert_eq!(catalog.get_or_fetch(fetch).unwrap(), &[entity(1, "Tech")]);
        assert_eq!(fetches.get(), 1);

        catalog.invalidate();
        assert!(!catalog.is_populated());
        catalog.get_or_fetch(fetch).unwrap();
        assert_eq!(fetches.get(), 2);
    }

    #[test]
    fn empty_catalog_counts_as_populated() {
        let fetches = Cell::new(0);
        let fetch = || -> Result<Vec<NamedEntity>, RemoteError> {
            fetches.set(fetches.get() + 1);
            Ok(Vec::new())
        };
        let mut catalog = Catalog::new("portfolio board");

        assert!(catalog.get_or_fetch(fetch).unwrap().is_empty());
        assert!(catalog.get_or_fetch(fetch).unwrap().is_empty());
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn failed_fetch_stays_unpopulated() {
        let mut catalog = Catalog::new("tag");
        let res = catalog.get_or_fetch(|| {
            Err(RemoteError::Status {
                status: 500,
                url: "https://acme.teamwork.com/tags.json".to_string(),
            })
        });

        assert!(res.is_err());
        assert!(!catalog.is_populated());
    }
}
