use serde::Deserialize;
use serde::Serialize;

use crate::github::json::repository::Repository;
use crate::github::json::user::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Custom wrapper for a repository invitation; both the ones received by the authenticated user and the
/// ones issued when adding a collaborator.
pub struct Invitation {
    pub id: u64,
    pub repository: Repository,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitee: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
}
