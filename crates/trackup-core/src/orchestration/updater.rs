//! The per-execution update sequence

use crate::error::Result;
use crate::orchestration::version::VersionCache;
use crate::substitution::ResolvedContext;
use crate::traits::IssueTracker;
use crate::types::{
    AbortReason, InputConfig, IssueSummary, TraceCategory, TraceEvent, TraceSeverity,
    UpdateOutcome, Verdict,
};

/// Orchestrates one execution: query, policy branching, per-issue updates.
///
/// Borrows everything for the duration of the run; the resolved context is
/// immutable, so nothing here can leak state across executions.
pub struct IssueUpdater<'a, C> {
    tracker: &'a C,
    config: &'a InputConfig<'a>,
    ctx: &'a ResolvedContext,
}

impl<'a, C: IssueTracker> IssueUpdater<'a, C> {
    /// Create a new updater over a tracker, a configuration, and the
    /// resolved template values for this execution.
    pub fn new(tracker: &'a C, config: &'a InputConfig<'a>, ctx: &'a ResolvedContext) -> Self {
        Self {
            tracker,
            config,
            ctx,
        }
    }

    /// Run the update sequence and return the outcome.
    ///
    /// Query failures and empty result sets are converted to a verdict per
    /// the fail-fast switches; per-issue mutation errors propagate out
    /// unmodified, terminating the batch with no rollback of issues
    /// already updated.
    pub async fn run(&self) -> Result<UpdateOutcome> {
        let mut outcome = UpdateOutcome::default();

        // Step 1: execute the resolved query
        let issues = match self.tracker.find_issues(&self.ctx.jql).await {
            Ok(issues) => issues,
            Err(e) => {
                trace(
                    &mut outcome,
                    TraceSeverity::SoftError,
                    TraceCategory::Query,
                    format!(
                        "Tracker could not execute your JQL, '{}': {}",
                        self.ctx.jql,
                        e.message()
                    ),
                );

                // Any query failure falls under the jql switch; connection
                // failures are additionally caught by the connection switch
                if self.config.fail_if_jql_fails {
                    return Ok(self.abort(outcome, AbortReason::QueryFailed));
                }
                if e.is_connection() && self.config.fail_if_no_connection {
                    return Ok(self.abort(outcome, AbortReason::NoConnection));
                }
                Vec::new()
            }
        };

        outcome.matched = issues.len();

        // Step 2: inspect the result set
        if issues.is_empty() {
            trace(
                &mut outcome,
                TraceSeverity::Warning,
                TraceCategory::Query,
                format!(
                    "Your JQL, '{}' did not return any issues. No issues will be updated during this build.",
                    self.ctx.jql
                ),
            );
            if self.config.fail_if_no_issues_returned {
                return Ok(self.abort(outcome, AbortReason::NoIssuesMatched));
            }
            return Ok(outcome);
        }

        if self.ctx.workflow_action_name.is_empty() {
            trace(
                &mut outcome,
                TraceSeverity::Warning,
                TraceCategory::Issue,
                "No workflow action was specified, thus no status update will be made for any of the matching issues.".to_string(),
            );
        }
        if self.ctx.comment.is_empty() {
            trace(
                &mut outcome,
                TraceSeverity::Warning,
                TraceCategory::Issue,
                "No comment was specified, thus no comment will be added to any of the matching issues.".to_string(),
            );
        }
        trace(
            &mut outcome,
            TraceSeverity::Info,
            TraceCategory::Query,
            format!("Using JQL: {}", self.ctx.jql),
        );
        trace(
            &mut outcome,
            TraceSeverity::Info,
            TraceCategory::Query,
            format!("The selected issues ({} in total) are:", issues.len()),
        );

        // Step 3: version cache scoped to this update phase. Fixed-version
        // application is an extension point (`apply_fixed_versions`) not
        // wired into this sequence.
        let _version_cache = VersionCache::new();

        // Step 4: update each issue in tracker order: transition, comment,
        // field. Errors propagate, aborting the batch on the first failure.
        let field_id = self.config.custom_field_id.as_deref().unwrap_or("");
        for issue in &issues {
            trace(
                &mut outcome,
                TraceSeverity::Info,
                TraceCategory::Issue,
                format!("Updating {}  \t{}", issue.key, issue.fields.summary),
            );
            self.tracker
                .apply_transition(issue, &self.ctx.workflow_action_name)
                .await?;
            self.tracker.add_comment(issue, &self.ctx.comment).await?;
            self.tracker
                .set_custom_field(issue, field_id, &self.ctx.custom_field_value)
                .await?;
            outcome.updated += 1;
        }

        Ok(outcome)
    }

    /// Apply the resolved fixed-version list to one issue.
    ///
    /// Extension point: declared and tested, but not invoked by [`run`].
    /// Version names that do not exist are created when
    /// `create_non_existing_fixed_versions` is set, otherwise skipped
    /// with a warning in the outcome trace.
    /// With `resetting_fixed_versions` the issue's list is replaced even
    /// when nothing resolved (clearing it); without it, an empty resolved
    /// list leaves the issue untouched.
    ///
    /// [`run`]: IssueUpdater::run
    pub async fn apply_fixed_versions(
        &self,
        cache: &mut VersionCache,
        issue: &IssueSummary,
        outcome: &mut UpdateOutcome,
    ) -> Result<()> {
        let mut ids = Vec::new();
        for name in &self.ctx.fixed_version_names {
            match cache
                .resolve(
                    self.tracker,
                    issue.project_key(),
                    name,
                    self.config.create_non_existing_fixed_versions,
                )
                .await?
            {
                Some(id) => ids.push(id),
                None => trace(
                    outcome,
                    TraceSeverity::Warning,
                    TraceCategory::Version,
                    format!(
                        "Version '{}' does not exist in project {}, skipping it.",
                        name,
                        issue.project_key()
                    ),
                ),
            }
        }

        if ids.is_empty() && !self.config.resetting_fixed_versions {
            return Ok(());
        }
        self.tracker.set_fixed_versions(issue, &ids).await
    }

    fn abort(&self, mut outcome: UpdateOutcome, reason: AbortReason) -> UpdateOutcome {
        let switch = match reason {
            AbortReason::QueryFailed => "fail_if_jql_fails",
            AbortReason::NoConnection => "fail_if_no_connection",
            AbortReason::NoIssuesMatched => "fail_if_no_issues_returned",
        };
        trace(
            &mut outcome,
            TraceSeverity::SoftError,
            TraceCategory::Policy,
            format!("'{}' is set, failing build", switch),
        );
        outcome.verdict = Verdict::Abort(reason);
        outcome
    }
}

fn trace(
    outcome: &mut UpdateOutcome,
    severity: TraceSeverity,
    category: TraceCategory,
    message: String,
) {
    outcome.trace.push(TraceEvent {
        severity,
        category,
        message,
    });
}
