//! Collaborator trait at the tracker seam
//!
//! The orchestrator is generic over `IssueTracker`, so the REST client can
//! be swapped for a scripted implementation in tests without boxing or
//! dynamic dispatch.

use crate::error::Result;
use crate::types::IssueSummary;

/// Operations the update orchestration needs from the remote tracker.
///
/// Implemented over REST by [`crate::http::RestClient`]. Query operations
/// fail with `Error::Query` (or `Error::Http` for connection-level
/// failures), mutations with `Error::Update`.
pub trait IssueTracker {
    /// Execute an issue query and return the matching summaries, in
    /// tracker order.
    fn find_issues(&self, jql: &str) -> impl std::future::Future<Output = Result<Vec<IssueSummary>>> + Send;

    /// Apply the named workflow transition to an issue.
    fn apply_transition(
        &self,
        issue: &IssueSummary,
        action_name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Add a comment to an issue.
    fn add_comment(
        &self,
        issue: &IssueSummary,
        body: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Set a custom field on an issue to an arbitrary string value.
    fn set_custom_field(
        &self,
        issue: &IssueSummary,
        field_id: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Look up the id of a named version in a project, if it exists.
    ///
    /// Part of the fixed-version extension point; not invoked by the
    /// orchestration sequence itself.
    fn resolve_version_id(
        &self,
        project_key: &str,
        version_name: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Create a version in a project and return its id.
    ///
    /// Part of the fixed-version extension point.
    fn create_version(
        &self,
        project_key: &str,
        version_name: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Replace the fixed-version list of an issue with the given ids.
    ///
    /// Part of the fixed-version extension point.
    fn set_fixed_versions(
        &self,
        issue: &IssueSummary,
        version_ids: &[String],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
