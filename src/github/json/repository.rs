use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

use crate::github::json::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Custom wrapper for a GitHub repository.
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_ignored_and_flags_default_to_false() {
        let raw = r#"{
            "id": 1296269,
            "node_id": "MDEwOlJlcG9zaXRvcnkxMjk2MjY5",
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "html_url": "https://github.com/octocat/Hello-World",
            "git_url": "git://github.com/octocat/Hello-World.git",
            "stargazers_count": 80
        }"#;

        let repository: Repository = serde_json::from_str(raw).unwrap();

        assert_eq!(repository.full_name, "octocat/Hello-World");
        assert_eq!(repository.git_url.as_deref(), Some("git://github.com/octocat/Hello-World.git"));
        assert!(!repository.fork);
        assert!(!repository.private);
        assert_eq!(repository.owner, None);
    }
}
