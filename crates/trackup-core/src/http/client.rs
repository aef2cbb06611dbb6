//! Tracker REST API client (JIRA REST v2 wire format)

use crate::error::{Error, Result};
use crate::traits::IssueTracker;
use crate::types::IssueSummary;
use serde::Deserialize;
use serde_json::json;

/// Accepted transport schemes for the base API URL
const HTTP_PROTOCOL_PREFIX: &str = "http://";
const HTTPS_PROTOCOL_PREFIX: &str = "https://";

/// Issues fetched per search page
const SEARCH_PAGE_SIZE: usize = 50;

/// Safety limit to prevent infinite pagination loops
const MAX_SEARCH_PAGES: usize = 1000;

/// Search endpoint response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<IssueSummary>,
}

/// Transitions endpoint response
#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

/// A workflow transition available on an issue
#[derive(Debug, Deserialize)]
struct Transition {
    id: String,
    name: String,
}

/// A project version entry
#[derive(Debug, Deserialize)]
struct ProjectVersion {
    id: String,
    name: String,
}

/// REST client implementing [`IssueTracker`] against a tracker API.
///
/// Connection parameters are read-only after construction, so one client
/// is safe to share across executions.
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    user_name: String,
    password: String,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a new client for the given base API URL.
    ///
    /// The URL must start with `http://` or `https://`; anything else is a
    /// configuration error surfaced here, before any execution runs.
    pub fn new(base_url: &str, user_name: &str, password: &str) -> Result<Self> {
        if !base_url.starts_with(HTTP_PROTOCOL_PREFIX)
            && !base_url.starts_with(HTTPS_PROTOCOL_PREFIX)
        {
            return Err(Error::Config(format!(
                "tracker URL must start with {} or {}, got '{}'",
                HTTP_PROTOCOL_PREFIX, HTTPS_PROTOCOL_PREFIX, base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("trackup/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_name: user_name.to_string(),
            password: password.to_string(),
        })
    }

    /// Base API URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth(&self.user_name, Some(&self.password))
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .basic_auth(&self.user_name, Some(&self.password))
            .json(body)
    }

    fn put(&self, url: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.client
            .put(url)
            .basic_auth(&self.user_name, Some(&self.password))
            .json(body)
    }

    /// Map a mutation response status to the update error taxonomy
    fn check_update_status(response: &reqwest::Response, what: &str, key: &str) -> Result<()> {
        if !response.status().is_success() {
            return Err(Error::Update(format!(
                "{} on {} returned {}",
                what,
                key,
                response.status()
            )));
        }
        Ok(())
    }
}

impl IssueTracker for RestClient {
    async fn find_issues(&self, jql: &str) -> Result<Vec<IssueSummary>> {
        let url = format!("{}/search", self.base_url);
        let mut all_issues = Vec::new();
        let mut start_at = 0usize;

        // Paginate until a short page
        for _ in 0..MAX_SEARCH_PAGES {
            let start = start_at.to_string();
            let page_size = SEARCH_PAGE_SIZE.to_string();
            let response = self
                .get(&url)
                .query(&[
                    ("jql", jql),
                    ("startAt", start.as_str()),
                    ("maxResults", page_size.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(Error::Query(format!(
                    "search returned {}",
                    response.status()
                )));
            }

            let page: SearchResponse = response
                .json()
                .await
                .map_err(|e| Error::Json(format!("search response: {}", e)))?;

            let n = page.issues.len();
            all_issues.extend(page.issues);
            if n < SEARCH_PAGE_SIZE {
                return Ok(all_issues);
            }
            start_at += n;
        }

        Err(Error::Query("too many pages in search response".to_string()))
    }

    async fn apply_transition(&self, issue: &IssueSummary, action_name: &str) -> Result<()> {
        if action_name.is_empty() {
            return Ok(());
        }

        // Transition ids are issue-specific: look up the id by name first
        let url = format!("{}/issue/{}/transitions", self.base_url, issue.key);
        let response = self.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Update(format!(
                "listing transitions on {} returned {}",
                issue.key,
                response.status()
            )));
        }

        let listing: TransitionsResponse = response
            .json()
            .await
            .map_err(|e| Error::Json(format!("transitions response: {}", e)))?;

        let transition = listing
            .transitions
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(action_name))
            .ok_or_else(|| {
                Error::Update(format!(
                    "no transition named '{}' available on {}",
                    action_name, issue.key
                ))
            })?;

        let body = json!({ "transition": { "id": transition.id } });
        let response = self.post(&url, &body).send().await?;
        Self::check_update_status(&response, "transition", &issue.key)
    }

    async fn add_comment(&self, issue: &IssueSummary, body: &str) -> Result<()> {
        if body.is_empty() {
            return Ok(());
        }

        let url = format!("{}/issue/{}/comment", self.base_url, issue.key);
        let payload = json!({ "body": body });
        let response = self.post(&url, &payload).send().await?;
        Self::check_update_status(&response, "comment", &issue.key)
    }

    async fn set_custom_field(
        &self,
        issue: &IssueSummary,
        field_id: &str,
        value: &str,
    ) -> Result<()> {
        if field_id.is_empty() {
            return Ok(());
        }

        let url = format!("{}/issue/{}", self.base_url, issue.key);
        let payload = json!({ "fields": { field_id: value } });
        let response = self.put(&url, &payload).send().await?;
        Self::check_update_status(&response, "field update", &issue.key)
    }

    async fn resolve_version_id(
        &self,
        project_key: &str,
        version_name: &str,
    ) -> Result<Option<String>> {
        let url = format!("{}/project/{}/versions", self.base_url, project_key);
        let response = self.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Update(format!(
                "listing versions for {} returned {}",
                project_key,
                response.status()
            )));
        }

        let versions: Vec<ProjectVersion> = response
            .json()
            .await
            .map_err(|e| Error::Json(format!("versions response: {}", e)))?;

        Ok(versions
            .into_iter()
            .find(|v| v.name == version_name)
            .map(|v| v.id))
    }

    async fn create_version(&self, project_key: &str, version_name: &str) -> Result<String> {
        let url = format!("{}/version", self.base_url);
        let payload = json!({ "name": version_name, "project": project_key });
        let response = self.post(&url, &payload).send().await?;
        if !response.status().is_success() {
            return Err(Error::Update(format!(
                "creating version '{}' in {} returned {}",
                version_name,
                project_key,
                response.status()
            )));
        }

        let created: ProjectVersion = response
            .json()
            .await
            .map_err(|e| Error::Json(format!("create version response: {}", e)))?;
        Ok(created.id)
    }

    async fn set_fixed_versions(&self, issue: &IssueSummary, version_ids: &[String]) -> Result<()> {
        let url = format!("{}/issue/{}", self.base_url, issue.key);
        let ids: Vec<serde_json::Value> = version_ids.iter().map(|id| json!({ "id": id })).collect();
        let payload = json!({ "fields": { "fixVersions": ids } });
        let response = self.put(&url, &payload).send().await?;
        Self::check_update_status(&response, "fixed versions update", &issue.key)
    }
}
