//! A connection pool manager for GitHub.
//!
//! In addition to being the caretaker of the available pool of connections (both creating new and recycling
//! old ones); it stores the optional `Personal Access Token` used to access GitHub's REST API.
//! <br/><br/>
//!
//! ### Usage example:
//!
//! ```rust,ignore
//! use crate::github::client::pool::{GitHubConnectionPoolManager, build_connection_pool};
//!
//! let github_token = Some("MY_AWESOME_PERSONAL_ACCESS_TOKEN".to_string());
//! let connection_pool_size = 20;
//!
//! let pool = build_connection_pool(
//!     GitHubConnectionPoolManager::new(github_token),
//!     connection_pool_size
//! )?;
//! ```
//!
//! See more: [https://docs.github.com/en/github/authenticating-to-github/creating-a-personal-access-token](https://docs.github.com/en/github/authenticating-to-github/creating-a-personal-access-token)

use deadpool::managed::{self, Metrics, RecycleResult};
use log::trace;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use thiserror::Error;

use crate::ctl_error::CtlError;

#[derive(Debug, Error)]
pub enum GitHubPoolError {
    #[error("could not build GitHub client: {0}")]
    ClientBuildError(#[from] octocrab::Error),
}

pub struct GitHubConnectionPoolManager {
    github_personal_token: Option<String>,
}

impl GitHubConnectionPoolManager {
    /// Instantiates a new [`GitHubConnectionPoolManager`]. Without a token, clients are anonymous.
    pub fn new(github_personal_token: Option<String>) -> Self {
        GitHubConnectionPoolManager {
            github_personal_token,
        }
    }

    /// Builds a GitHub client configured with the pre-loaded personal token, if any. Failed requests are
    /// never retried: the first upstream error is final.
    fn build_github_client(&self) -> Result<Octocrab, GitHubPoolError> {
        let builder = Octocrab::builder().add_retry_config(RetryConfig::None);
        let client = match &self.github_personal_token {
            Some(token) => builder.personal_token(token.clone()).build()?,
            None => builder.build()?,
        };
        Ok(client)
    }
}

pub type GitHubConnectionPool = managed::Pool<GitHubConnectionPoolManager>;

/// Managed pool's async implementation for [`deadpool`]'s generic trait.
/// See more: [https://docs.rs/deadpool/0.12.1/deadpool/managed/index.html](https://docs.rs/deadpool/0.12.1/deadpool/managed/index.html)
impl managed::Manager for GitHubConnectionPoolManager {
    type Type = Octocrab;
    type Error = GitHubPoolError;

    async fn create(&self) -> Result<Octocrab, GitHubPoolError> {
        trace!("Retrieving new connection from the pool...");
        self.build_github_client()
    }

    async fn recycle(&self, _old: &mut Octocrab, _metrics: &Metrics) -> RecycleResult<GitHubPoolError> {
        trace!("Recycling connection back into the pool...");
        Ok(())
    }
}

/// Builds a pool holding at most `max_size` GitHub clients.
pub fn build_connection_pool(
    manager: GitHubConnectionPoolManager, max_size: usize,
) -> Result<GitHubConnectionPool, CtlError> {
    GitHubConnectionPool::builder(manager)
        .max_size(max_size.max(1))
        .build()
        .map_err(|e| CtlError::ConnectionPoolError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::github::client::test_server;

    #[tokio::test]
    async fn failed_requests_are_sent_only_once() {
        let (base_url, hits) = test_server::serve("502 Bad Gateway", r#"{"message":"Server Error"}"#).await;
        let client = GitHubConnectionPoolManager::new(None).build_github_client().unwrap();

        let result: Result<serde_json::Value, _> =
            client.get(format!("{}/user/repos?page=3", base_url), None::<&()>).await;

        assert!(result.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pool_never_holds_less_than_one_client() {
        let pool = build_connection_pool(GitHubConnectionPoolManager::new(None), 0).unwrap();

        assert_eq!(pool.status().max_size, 1);
    }
}
