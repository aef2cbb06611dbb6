//! Update orchestration: query, policy branching, per-issue update loop

pub mod updater;
pub mod version;

pub use updater::IssueUpdater;
pub use version::VersionCache;
