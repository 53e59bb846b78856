//! Opening repository pages in the user's browser.

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;

use crate::ctl_error::CtlError;
use crate::nested;

pub const GITHUB_WEB_URL: &str = "https://github.com";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Browser: Send + Sync {
    /// Whether `url` answers with anything but `404 Not Found`.
    async fn is_reachable(&self, url: &str) -> Result<bool, CtlError>;

    fn open(&self, url: &str) -> Result<(), CtlError>;
}

pub struct SystemBrowser {
    http_client: reqwest::Client,
}

impl SystemBrowser {
    pub fn new() -> Self {
        SystemBrowser {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for SystemBrowser {
    fn default() -> Self {
        SystemBrowser::new()
    }
}

#[async_trait]
impl Browser for SystemBrowser {
    async fn is_reachable(&self, url: &str) -> Result<bool, CtlError> {
        let response = self.http_client.get(url).send().await.map_err(|e| CtlError::BrowserError {
            url: url.to_string(),
            nested: nested!(e),
        })?;
        debug!("[{}] answered with [{}].", url, response.status());

        Ok(response.status() != StatusCode::NOT_FOUND)
    }

    fn open(&self, url: &str) -> Result<(), CtlError> {
        open::that(url).map_err(|e| CtlError::BrowserError {
            url: url.to_string(),
            nested: nested!(e),
        })
    }
}
