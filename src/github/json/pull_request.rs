use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

use crate::github::json::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A pull request, as reported either by the issue search endpoint or by a repository's pull listing.
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub html_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
    /// API URL of the owning repository (search results only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl PullRequestSummary {
    /// `owner/repo` of the pull request, derived from its HTML URL
    /// (`https://github.com/<owner>/<repo>/pull/<number>`).
    pub fn repository_full_name(&self) -> Option<String> {
        let mut segments = self.html_url.path_segments()?;
        let owner = segments.next().filter(|s| !s.is_empty())?;
        let repo = segments.next().filter(|s| !s.is_empty())?;
        Some(format!("{}/{}", owner, repo))
    }
}
