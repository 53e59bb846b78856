//!A universal, project-wide error wrapper that is also able to retain the nested cause of an [`Error`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtlError {
    #[error("{command:?} command requires {requirement} {usage} {expected} argument(s)")]
    ArgumentCountError {
        command: String,
        requirement: &'static str,
        usage: String,
        expected: usize,
    },
    // :# prints causes as well using anyhow's default formatting of causes
    #[error("Error during async task execution; nested = {0:#}")]
    AsyncTaskError(anyhow::Error),
    #[error("{user} user already collaborator on {repository}")]
    AlreadyCollaboratorError { user: String, repository: String },
    #[error("could not open [{url}] in a browser; nested = {nested:#}")]
    BrowserError {
        url: String,
        #[source]
        nested: anyhow::Error,
    },
    #[error("cancelled: {0}")]
    CancelledError(String),
    #[error("GitHub connection pool error: {0}")]
    ConnectionPoolError(String),
    #[error("{0}")]
    InvalidArgumentError(String),
    #[error("I/O error: {msg}; nested = {nested:#}")]
    IoError {
        msg: String,
        #[source]
        nested: anyhow::Error,
    },
    #[error("JSON serialization error: {msg}; nested = {nested:#}")]
    JsonSerializationError {
        msg: String,
        #[source]
        nested: anyhow::Error,
    },
    #[error("{0}")]
    NotFoundError(String),
    #[error("{operation}: hit GitHub API rate limit")]
    RateLimitError { operation: String },
    #[error("{operation}: could not process [{resource}]; nested = {nested:#}")]
    UpstreamAPIError {
        operation: String,
        resource: String,
        #[source]
        nested: anyhow::Error,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CtlError {
    /// Whether this error stands for an aborted operation rather than a failed one.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CtlError::CancelledError(_))
    }
}

#[macro_export]
/// Wraps a dynamic error type into an [`anyhow::Error`]. Useful in a plethora of cases for constructing
/// [`CtlError`]s.
macro_rules! nested {
    ($source:expr) => {
        anyhow::Error::new($source)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_count_error_names_the_command_and_its_usage() {
        let error = CtlError::ArgumentCountError {
            command: "delete".to_string(),
            requirement: "exactly",
            usage: "<repository>".to_string(),
            expected: 1,
        };

        assert_eq!(
            error.to_string(),
            "\"delete\" command requires exactly <repository> 1 argument(s)"
        );
    }

    #[test]
    fn rate_limit_error_keeps_a_dedicated_message() {
        let error = CtlError::RateLimitError {
            operation: "repo".to_string(),
        };

        assert_eq!(error.to_string(), "repo: hit GitHub API rate limit");
        assert!(!error.is_cancellation());
    }

    #[test]
    fn upstream_errors_print_their_nested_cause() {
        let error = CtlError::UpstreamAPIError {
            operation: "could not list starred repositories".to_string(),
            resource: "zchee".to_string(),
            nested: anyhow::anyhow!("502 Bad Gateway"),
        };

        assert_eq!(
            error.to_string(),
            "could not list starred repositories: could not process [zchee]; nested = 502 Bad Gateway"
        );
    }

    #[test]
    fn only_cancelled_errors_are_cancellations() {
        assert!(CtlError::CancelledError("user interrupt".to_string()).is_cancellation());
        assert!(!CtlError::NotFoundError("nothing".to_string()).is_cancellation());
    }
}
