use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Custom wrapper for a GitHub user (or organization) account.
pub struct User {
    pub login: String,
    pub id: u64,
}
