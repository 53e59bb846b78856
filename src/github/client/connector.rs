//! Utilities for any and all `type`s that want to be able to establish a managed pool connection against
//! GitHub.

use async_trait::async_trait;
use deadpool::managed::Object;
use log::error;

use crate::ctl_error::CtlError;
use crate::github::client::pool::{GitHubConnectionPool, GitHubConnectionPoolManager};

pub type GitHubConnection = Object<GitHubConnectionPoolManager>;

/// Trait for any and all `type`s that want to be able to establish a managed pool connection against
/// GitHub.
#[async_trait]
pub trait GitHubConnector: Sync {
    /// Getter for the GitHub connection pool;
    fn get_connection_pool(&self) -> &GitHubConnectionPool;

    /// Retrieves a GitHub client configured with the pre-loaded personal token from the connection pool.
    async fn get_github_client(&self) -> Result<GitHubConnection, CtlError> {
        self.get_connection_pool().get().await.map_err(|e| {
            error!("Could not retrieve a GitHub managed connection from the pool.");
            CtlError::ConnectionPoolError(e.to_string())
        })
    }
}
