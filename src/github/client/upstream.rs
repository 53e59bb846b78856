//! Translation of upstream (octocrab) failures into [`CtlError`]s.
//!
//! Quota exhaustion gets its own [`CtlError::RateLimitError`] so the user is told to wait instead of being
//! shown a raw HTTP failure; everything else is wrapped together with the failed operation and resource.

use log::{debug, trace};

use crate::ctl_error::CtlError;
use crate::nested;

/// GitHub reports exhausted quotas either as `429 Too Many Requests` or as `403 Forbidden` with a
/// "rate limit" message (primary and secondary limits alike).
pub fn is_rate_limit_shape(status: u16, message: &str) -> bool {
    match status {
        429 => true,
        403 => message.to_ascii_lowercase().contains("rate limit"),
        _ => false,
    }
}

/// HTTP status of a GitHub API error response, if the failure got that far.
pub fn status_of(error: &octocrab::Error) -> Option<u16> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

pub fn classify(error: octocrab::Error, operation: &str, resource: &str) -> CtlError {
    trace!("Upstream error = {:?}", error);

    if let octocrab::Error::GitHub { source, .. } = &error {
        if is_rate_limit_shape(source.status_code.as_u16(), &source.message) {
            debug!("[{}] on [{}] hit the GitHub API rate limit.", operation, resource);
            return CtlError::RateLimitError {
                operation: operation.to_string(),
            };
        }
    }

    CtlError::UpstreamAPIError {
        operation: operation.to_string(),
        resource: resource.to_string(),
        nested: nested!(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::test_server::failed_request;

    #[test]
    fn too_many_requests_is_always_a_rate_limit() {
        assert!(is_rate_limit_shape(429, ""));
    }

    #[test]
    fn forbidden_is_a_rate_limit_only_when_github_says_so() {
        assert!(is_rate_limit_shape(403, "API rate limit exceeded for 127.0.0.1."));
        assert!(is_rate_limit_shape(403, "You have exceeded a secondary Rate Limit."));
        assert!(!is_rate_limit_shape(403, "Resource not accessible by integration"));
    }

    #[test]
    fn other_statuses_are_never_rate_limits() {
        assert!(!is_rate_limit_shape(404, "rate limit"));
        assert!(!is_rate_limit_shape(500, "Server Error"));
    }

    #[tokio::test]
    async fn rate_limited_responses_become_rate_limit_errors() {
        let forbidden =
            failed_request("403 Forbidden", r#"{"message":"API rate limit exceeded for 127.0.0.1."}"#).await;
        let too_many = failed_request("429 Too Many Requests", r#"{"message":"Too Many Requests"}"#).await;

        assert_eq!(status_of(&forbidden), Some(403));
        assert!(matches!(
            classify(forbidden, "could not list repositories", "zchee"),
            CtlError::RateLimitError { operation } if operation == "could not list repositories"
        ));
        assert!(matches!(
            classify(too_many, "could not list starred repositories", "zchee"),
            CtlError::RateLimitError { .. }
        ));
    }

    #[tokio::test]
    async fn other_failures_keep_operation_and_resource() {
        let not_found = failed_request("404 Not Found", r#"{"message":"Not Found"}"#).await;
        let forbidden = failed_request("403 Forbidden", r#"{"message":"Must have admin rights"}"#).await;

        assert_eq!(status_of(&not_found), Some(404));
        match classify(not_found, "could not delete the repository", "zchee/ghctl") {
            CtlError::UpstreamAPIError { operation, resource, .. } => {
                assert_eq!(operation, "could not delete the repository");
                assert_eq!(resource, "zchee/ghctl");
            }
            other => panic!("expected an upstream error, got {:?}", other),
        }
        assert!(matches!(
            classify(forbidden, "could not delete the repository", "zchee/ghctl"),
            CtlError::UpstreamAPIError { .. }
        ));
    }
}
