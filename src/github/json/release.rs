use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Custom wrapper for a GitHub release.
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub html_url: Url,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Payload for creating a release. The release is named after its tag.
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl NewRelease {
    pub fn new(tag: &str, draft: bool, prerelease: bool) -> Self {
        NewRelease {
            tag_name: tag.to_string(),
            name: tag.to_string(),
            body: format!("Release {}.", tag),
            draft,
            prerelease,
        }
    }
}
