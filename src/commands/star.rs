//! `star` subcommands.

use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;

use crate::commands::{lines, to_json, CommandContext};
use crate::config::StarListOptions;
use crate::ctl_error::CtlError;
use crate::github::client::gateway::StarredQuery;
use crate::github::json::repository::Repository;

/// One starred repository, as printed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarredEntry {
    #[serde(rename = "ownername")]
    pub owner_name: String,
    pub url: String,
}

impl StarredEntry {
    fn from_repository(repository: Repository, git_url: bool) -> Self {
        let url = match (git_url, repository.git_url) {
            (true, Some(git_url)) => git_url,
            _ => repository.html_url.to_string(),
        };

        StarredEntry {
            owner_name: repository.full_name,
            url,
        }
    }
}

/// Repositories starred by `username` (the authenticated user by default), sorted by full name.
pub async fn list(ctx: &CommandContext, options: &StarListOptions) -> Result<String, CtlError> {
    let gateway = Arc::clone(&ctx.gateway);
    let starred = ctx
        .fetcher()
        .fetch_all(StarredQuery::new(options.username.clone()), move |request| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.list_starred(request).await }
        })
        .await;
    ctx.spin.flush();

    let entries: Vec<StarredEntry> = starred?
        .into_iter()
        .map(|repository| StarredEntry::from_repository(repository, options.git_url))
        .sorted_by(|a, b| a.owner_name.cmp(&b.owner_name))
        .collect();

    if entries.is_empty() {
        let user = match &options.username {
            Some(username) => username.clone(),
            None => ctx.authenticated_login().await?,
        };
        return Err(CtlError::NotFoundError(format!("{} user have not starred repository", user)));
    }

    if ctx.is_json() {
        return to_json(&entries);
    }

    let width = entries.iter().map(|entry| entry.owner_name.len()).max().unwrap_or_default();
    Ok(lines(
        entries
            .iter()
            .map(|entry| format!("owner: {:<width$}  url: {}", entry.owner_name, entry.url, width = width)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MockBrowser;
    use crate::commands::test_support::*;
    use crate::config::OutputFormat;
    use crate::github::client::gateway::MockForgeGateway;
    use crate::github::utils::pagination::PageResult;
    use crate::terminal::prompt::MockPrompter;

    fn starring(pages: Vec<Vec<&'static str>>) -> MockForgeGateway {
        let mut gateway = MockForgeGateway::new();
        let last_page = pages.len() as u32;
        gateway.expect_list_starred().returning(move |request| {
            let items = pages[(request.page() - 1) as usize]
                .iter()
                .map(|full_name| repository(full_name, false))
                .collect();
            Ok(PageResult::new(items, last_page, None))
        });
        gateway
    }

    #[tokio::test]
    async fn entries_are_sorted_and_aligned() {
        let gateway = starring(vec![vec!["zchee/ghctl"], vec!["rust-lang/rust", "a/b"]]);
        let options = StarListOptions {
            username: Some("zchee".to_string()),
            git_url: false,
        };

        assert_eq!(
            list(&context(gateway), &options).await.unwrap(),
            "owner: a/b             url: https://github.com/a/b\n\
             owner: rust-lang/rust  url: https://github.com/rust-lang/rust\n\
             owner: zchee/ghctl     url: https://github.com/zchee/ghctl"
        );
    }

    #[tokio::test]
    async fn git_urls_and_json_output() {
        let gateway = starring(vec![vec!["zchee/ghctl"]]);
        let ctx = context_with(gateway, MockPrompter::new(), MockBrowser::new(), OutputFormat::Json);
        let options = StarListOptions {
            username: None,
            git_url: true,
        };

        let output: serde_json::Value = serde_json::from_str(&list(&ctx, &options).await.unwrap()).unwrap();

        assert_eq!(
            output,
            serde_json::json!([{ "ownername": "zchee/ghctl", "url": "git://github.com/zchee/ghctl.git" }])
        );
    }

    #[tokio::test]
    async fn nothing_starred_is_not_found() {
        let mut gateway = starring(vec![vec![]]);
        gateway.expect_authenticated_user().returning(|| Ok(user("zchee")));
        let options = StarListOptions {
            username: None,
            git_url: false,
        };

        let error = list(&context(gateway), &options).await.unwrap_err();

        assert_eq!(error.to_string(), "zchee user have not starred repository");
    }
}
