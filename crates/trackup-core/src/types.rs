//! Core type definitions with zero-copy configuration

use serde::Deserialize;
use std::borrow::Cow;

/// A single issue returned by the tracker query.
///
/// Read-only from this crate's perspective; identified by its key.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IssueSummary {
    /// Issue key, e.g. `PROJ-123`
    pub key: String,
    /// Issue fields exposed by the search endpoint
    pub fields: IssueFields,
}

/// The subset of issue fields this crate reads
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct IssueFields {
    /// Human-readable one-line summary
    #[serde(default)]
    pub summary: String,
}

impl IssueSummary {
    /// Project key is the portion of the issue key before the first `-`
    /// (`PROJ-123` → `PROJ`). Keys without a dash are their own project key.
    #[inline]
    pub fn project_key(&self) -> &str {
        self.key.split('-').next().unwrap_or(&self.key)
    }
}

/// Why an execution aborted with a failure verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AbortReason {
    /// The tracker rejected or could not execute the query and
    /// `fail_if_jql_fails` is set
    QueryFailed,
    /// The tracker could not be reached and `fail_if_no_connection` is set
    NoConnection,
    /// Zero issues matched and `fail_if_no_issues_returned` is set
    NoIssuesMatched,
}

impl AbortReason {
    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QueryFailed => "query_failed",
            Self::NoConnection => "no_connection",
            Self::NoIssuesMatched => "no_issues_matched",
        }
    }
}

/// Build verdict produced by one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Continue the surrounding pipeline
    Continue,
    /// Abort the surrounding pipeline, with the policy that fired
    Abort(AbortReason),
}

impl Verdict {
    /// True when the pipeline should keep going
    #[inline]
    pub const fn is_continue(&self) -> bool {
        matches!(self, Verdict::Continue)
    }
}

/// Severity of a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceSeverity {
    /// Informational progress line
    Info,
    /// Something was skipped or empty, execution continues
    Warning,
    /// An error occurred but policy allowed the execution to continue
    SoftError,
}

/// Which stage of the execution produced a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCategory {
    /// Query execution and result inspection
    Query,
    /// A fail-fast policy decision
    Policy,
    /// Per-issue update progress
    Issue,
    /// Fixed-version resolution
    Version,
}

/// One human-readable line of the execution trace.
///
/// The trace is the build log a human reads to tell "no issues matched,
/// and that's acceptable" apart from "no issues matched, and that failed
/// the build".
#[derive(Debug, Clone)]
pub struct TraceEvent {
    /// Event severity
    pub severity: TraceSeverity,
    /// Stage that produced the event
    pub category: TraceCategory,
    /// Human-readable message
    pub message: String,
}

/// Result of one update execution
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Build verdict: continue or abort the pipeline
    pub verdict: Verdict,
    /// Number of issues the query matched
    pub matched: usize,
    /// Number of issues fully updated
    pub updated: usize,
    /// Human-readable execution trace
    pub trace: Vec<TraceEvent>,
}

impl Default for UpdateOutcome {
    fn default() -> Self {
        Self {
            verdict: Verdict::Continue,
            matched: 0,
            updated: 0,
            trace: Vec::new(),
        }
    }
}

/// Configuration input for one configured build step.
///
/// Supplied once per execution and never re-read mid-execution. The five
/// template fields may each independently be absent; absent resolves to the
/// empty string.
#[derive(Debug, Clone)]
pub struct InputConfig<'a> {
    // Tracker connection
    pub rest_api_url: Cow<'a, str>,
    pub user_name: Cow<'a, str>,
    pub password: Cow<'a, str>,

    // Templates (raw, unresolved)
    pub jql: Option<Cow<'a, str>>,
    pub workflow_action_name: Option<Cow<'a, str>>,
    pub comment: Option<Cow<'a, str>>,
    pub custom_field_value: Option<Cow<'a, str>>,
    pub fixed_versions: Option<Cow<'a, str>>,

    // Custom field target (opaque id, not a template)
    pub custom_field_id: Option<Cow<'a, str>>,

    // Fixed-version behavior
    pub resetting_fixed_versions: bool,
    pub create_non_existing_fixed_versions: bool,

    // Fail-fast policy — three independent switches
    pub fail_if_jql_fails: bool,
    pub fail_if_no_issues_returned: bool,
    pub fail_if_no_connection: bool,

    // Build-scoped parameters, merged over the environment
    pub parameters: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}

impl<'a> Default for InputConfig<'a> {
    fn default() -> Self {
        Self {
            rest_api_url: Cow::Borrowed(""),
            user_name: Cow::Borrowed(""),
            password: Cow::Borrowed(""),
            jql: None,
            workflow_action_name: None,
            comment: None,
            custom_field_value: None,
            fixed_versions: None,
            custom_field_id: None,
            resetting_fixed_versions: false,
            create_non_existing_fixed_versions: false,
            fail_if_jql_fails: false,
            fail_if_no_issues_returned: false,
            fail_if_no_connection: false,
            parameters: Vec::new(),
        }
    }
}
