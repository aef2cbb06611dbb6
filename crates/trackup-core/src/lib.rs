//! # Trackup Core
//!
//! Batch issue-tracker update engine for CI pipelines.
//!
//! One execution resolves `$name` build-parameter tokens in the configured
//! templates, queries the tracker for matching issues, and applies a
//! workflow transition, a comment, and a custom-field value to each, subject
//! to three independent fail-fast switches:
//! - **Literal substitution** — substring-based, deterministic, never regex
//! - **Immutable resolved context** — built once per execution, no shared
//!   mutable state across executions
//! - **Static-dispatch tracker seam** — the REST client sits behind the
//!   [`IssueTracker`] trait so tests can script the collaborator
//!
//! ## Example
//!
//! ```no_run
//! use trackup_core::{run_update, InputConfig};
//! use std::borrow::Cow;
//!
//! # async fn example() -> trackup_core::Result<()> {
//! let config = InputConfig {
//!     rest_api_url: Cow::Borrowed("https://tracker.example.com/rest/api/2"),
//!     user_name: Cow::Borrowed("ci-bot"),
//!     password: Cow::Borrowed("secret"),
//!     jql: Some(Cow::Borrowed("project=$PROJECT and status=Resolved")),
//!     comment: Some(Cow::Borrowed("Released in build $BUILD_NUMBER")),
//!     ..Default::default()
//! };
//!
//! let outcome = run_update(config).await?;
//! println!("Updated {} issues", outcome.updated);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod error;
pub mod http;
pub mod orchestration;
pub mod substitution;
pub mod traits;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use substitution::{ResolvedContext, VariableMap};
pub use traits::IssueTracker;
pub use types::{
    AbortReason, InputConfig, IssueFields, IssueSummary, TraceCategory, TraceEvent,
    TraceSeverity, UpdateOutcome, Verdict,
};

/// Run one update execution against the configured tracker.
///
/// This is the main entry point for the library. It handles:
/// - Variable map assembly (process environment merged with build
///   parameters, parameters winning)
/// - Template resolution into an immutable [`ResolvedContext`]
/// - REST client construction (base URL validated here)
/// - The update orchestration sequence
///
/// Returns an [`UpdateOutcome`] carrying the build verdict and the
/// execution trace. Per-issue mutation failures propagate as errors.
pub async fn run_update(config: InputConfig<'_>) -> Result<UpdateOutcome> {
    // The variable map must be fully assembled before any resolution
    let vars = VariableMap::merge(
        std::env::vars(),
        config
            .parameters
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref())),
    );
    let ctx = ResolvedContext::resolve(&config, &vars);

    let client = http::RestClient::new(
        config.rest_api_url.as_ref(),
        config.user_name.as_ref(),
        config.password.as_ref(),
    )?;

    let updater = orchestration::IssueUpdater::new(&client, &config, &ctx);
    updater.run().await
}

/// Synchronous variant of `run_update`
///
/// This creates a new Tokio runtime and blocks on the async version.
/// Prefer the async version if you're already in an async context.
pub fn run_update_sync(config: InputConfig<'_>) -> Result<UpdateOutcome> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Runtime(e.to_string()))?
        .block_on(run_update(config))
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_library_version() {
        // Smoke test to ensure library compiles
        let _ = env!("CARGO_PKG_VERSION");
    }
}
