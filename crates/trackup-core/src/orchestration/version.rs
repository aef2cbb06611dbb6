//! Per-execution version-name → id cache
//!
//! Scoped to one execution's update phase: allocated empty when the phase
//! starts, passed by `&mut` within that phase only, dropped when it
//! returns. Never persisted or shared, so staleness cannot leak across
//! concurrent executions of the same configured step.

use crate::error::Result;
use crate::traits::IssueTracker;
use std::collections::HashMap;

/// Cache of version ids keyed by project, then by version name.
///
/// Avoids one remote version listing per issue when multiple issues in the
/// same execution belong to the same project and reference the same
/// fixed-version name.
#[derive(Debug, Default)]
pub struct VersionCache {
    // project key -> version name -> version id
    cache: HashMap<String, HashMap<String, String>>,
}

impl VersionCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a version name to its id, consulting the cache first.
    ///
    /// On a miss, asks the tracker; if the version does not exist and
    /// `create_missing` is set, creates it. The id is cached either way.
    /// Returns `Ok(None)` for a version that does not exist and was not
    /// created.
    pub async fn resolve<C: IssueTracker>(
        &mut self,
        tracker: &C,
        project_key: &str,
        version_name: &str,
        create_missing: bool,
    ) -> Result<Option<String>> {
        if let Some(id) = self
            .cache
            .get(project_key)
            .and_then(|versions| versions.get(version_name))
        {
            return Ok(Some(id.clone()));
        }

        let id = match tracker.resolve_version_id(project_key, version_name).await? {
            Some(id) => id,
            None if create_missing => tracker.create_version(project_key, version_name).await?,
            None => return Ok(None),
        };

        self.cache
            .entry(project_key.to_string())
            .or_default()
            .insert(version_name.to_string(), id.clone());
        Ok(Some(id))
    }

    /// Look up a cached id without touching the tracker
    pub fn peek(&self, project_key: &str, version_name: &str) -> Option<&str> {
        self.cache
            .get(project_key)
            .and_then(|versions| versions.get(version_name))
            .map(String::as_str)
    }

    /// Number of projects with at least one cached version
    pub fn project_count(&self) -> usize {
        self.cache.len()
    }

    /// True when nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
