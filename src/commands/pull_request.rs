//! `pr` subcommands.

use std::sync::Arc;

use log::debug;

use crate::commands::{lines, to_json, CommandContext};
use crate::config::{PullRequestGetOptions, PullRequestListOptions};
use crate::ctl_error::CtlError;
use crate::github::client::gateway::{PullRequestQuery, PullRequestSearch};
use crate::github::json::pull_request::PullRequestSummary;

/// Issue search query for pull requests authored by `login` in the given `state`. Scopes holding a `/`
/// narrow the search to a repository, the others to an owner.
pub fn search_query(login: &str, state: &str, scopes: &[String]) -> String {
    let mut query = format!("author:{} state:{} type:pr", login, state);
    for scope in scopes {
        let qualifier = if scope.contains('/') { "repo" } else { "user" };
        query.push_str(&format!(" {}:{}", qualifier, scope));
    }
    query
}

fn is_ignored(pull_request: &PullRequestSummary, options: &PullRequestListOptions) -> bool {
    let full_name = match pull_request.repository_full_name() {
        Some(full_name) => full_name,
        None => return false,
    };
    let (owner, name) = full_name.split_once('/').unwrap_or((full_name.as_str(), ""));

    options.ignore_owners.iter().any(|ignored| ignored == owner)
        || options.ignore_repos.iter().any(|ignored| ignored == name || *ignored == full_name)
}

fn format_line(pull_request: &PullRequestSummary, markdown: bool) -> String {
    if markdown {
        format!("- [{}]({})", pull_request.title, pull_request.html_url)
    } else {
        format!(
            "url: {}, created: {}, title: {}",
            pull_request.html_url, pull_request.created_at, pull_request.title
        )
    }
}

fn render(ctx: &CommandContext, pull_requests: &[PullRequestSummary], markdown: bool) -> Result<String, CtlError> {
    if ctx.is_json() {
        return to_json(pull_requests);
    }
    Ok(lines(pull_requests.iter().map(|pull_request| format_line(pull_request, markdown))))
}

/// Pull requests sent by the authenticated user; merged/closed ones only unless `--all` is given.
pub async fn list(ctx: &CommandContext, options: &PullRequestListOptions) -> Result<String, CtlError> {
    let login = ctx.authenticated_login().await?;
    let order = if options.reverse { "desc" } else { "asc" };
    let states: &[&str] = if options.all { &["closed", "open"] } else { &["closed"] };

    let mut pull_requests = Vec::new();
    for state in states {
        let search = PullRequestSearch {
            q: search_query(&login, state, &options.scopes),
            sort: "updated",
            order,
        };
        debug!("Searching pull requests with [{}]...", search.q);

        let gateway = Arc::clone(&ctx.gateway);
        let found = ctx
            .fetcher()
            .fetch_all(search, move |request| {
                let gateway = Arc::clone(&gateway);
                async move { gateway.search_pull_requests(request).await }
            })
            .await;
        ctx.spin.flush();

        pull_requests.extend(found?);
    }

    pull_requests.retain(|pull_request| !is_ignored(pull_request, options));

    render(ctx, &pull_requests, options.markdown)
}

/// Closed pull requests of a repository, oldest first.
pub async fn get(ctx: &CommandContext, options: &PullRequestGetOptions) -> Result<String, CtlError> {
    let gateway = Arc::clone(&ctx.gateway);
    let pull_requests = ctx
        .fetcher()
        .fetch_all(PullRequestQuery::closed(options.repository.clone()), move |request| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.list_pull_requests(request).await }
        })
        .await;
    ctx.spin.flush();

    let pull_requests = pull_requests?;
    if pull_requests.is_empty() {
        return Err(CtlError::NotFoundError(format!(
            "{} repository has no closed pull request",
            options.repository
        )));
    }

    render(ctx, &pull_requests, options.markdown)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use reqwest::Url;

    use super::*;
    use crate::commands::test_support::*;
    use crate::config::RepoRef;
    use crate::github::client::gateway::MockForgeGateway;
    use crate::github::utils::pagination::PageResult;

    fn pull_request(full_name: &str, number: u64, title: &str) -> PullRequestSummary {
        PullRequestSummary {
            number,
            title: title.to_string(),
            html_url: Url::parse(&format!("https://github.com/{}/pull/{}", full_name, number)).unwrap(),
            state: Some("closed".to_string()),
            created_at: Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap(),
            updated_at: None,
            merged_at: None,
            repository_url: None,
            user: None,
        }
    }

    fn list_options(all: bool, markdown: bool) -> PullRequestListOptions {
        PullRequestListOptions {
            scopes: vec![],
            ignore_owners: vec!["golang".to_string()],
            ignore_repos: vec!["vim".to_string()],
            reverse: false,
            markdown,
            all,
        }
    }

    #[test]
    fn scopes_become_repo_or_user_qualifiers() {
        let scopes = vec!["rust-lang/rust".to_string(), "tokio-rs".to_string()];

        assert_eq!(
            search_query("zchee", "closed", &scopes),
            "author:zchee state:closed type:pr repo:rust-lang/rust user:tokio-rs"
        );
    }

    #[tokio::test]
    async fn list_walks_all_pages_and_drops_ignored_repositories() {
        let mut gateway = MockForgeGateway::new();
        gateway.expect_authenticated_user().returning(|| Ok(user("zchee")));
        gateway
            .expect_search_pull_requests()
            .withf(|request| request.options().q == "author:zchee state:closed type:pr")
            .returning(|request| {
                let items = match request.page() {
                    1 => vec![pull_request("golang/go", 1, "cmd/go: fix"), pull_request("zchee/ghctl", 2, "pr: add")],
                    _ => vec![pull_request("neovim/vim", 3, "ignored"), pull_request("rust-lang/rust", 4, "std: doc")],
                };
                Ok(PageResult::new(items, 2, None))
            });

        let output = list(&context(gateway), &list_options(false, true)).await.unwrap();

        assert_eq!(
            output,
            "- [pr: add](https://github.com/zchee/ghctl/pull/2)\n\
             - [std: doc](https://github.com/rust-lang/rust/pull/4)"
        );
    }

    #[tokio::test]
    async fn all_also_searches_open_pull_requests() {
        let mut gateway = MockForgeGateway::new();
        gateway.expect_authenticated_user().returning(|| Ok(user("zchee")));
        gateway.expect_search_pull_requests().times(2).returning(|request| {
            let number = if request.options().q.contains("state:open") { 2 } else { 1 };
            Ok(PageResult::single(vec![pull_request("zchee/ghctl", number, "change")]))
        });

        let output = list(&context(gateway), &list_options(true, false)).await.unwrap();

        assert_eq!(
            output,
            "url: https://github.com/zchee/ghctl/pull/1, created: 2020-01-02 03:04:05 UTC, title: change\n\
             url: https://github.com/zchee/ghctl/pull/2, created: 2020-01-02 03:04:05 UTC, title: change"
        );
    }

    #[tokio::test]
    async fn get_lists_closed_pull_requests_of_the_repository() {
        let mut gateway = MockForgeGateway::new();
        gateway
            .expect_list_pull_requests()
            .withf(|request| request.options() == &PullRequestQuery::closed(RepoRef::new("zchee", "ghctl")))
            .returning(|_| Ok(PageResult::single(vec![pull_request("zchee/ghctl", 9, "first")])));

        let options = PullRequestGetOptions {
            repository: RepoRef::new("zchee", "ghctl"),
            markdown: true,
        };

        assert_eq!(
            get(&context(gateway), &options).await.unwrap(),
            "- [first](https://github.com/zchee/ghctl/pull/9)"
        );
    }

    #[tokio::test]
    async fn get_without_pull_requests_is_not_found() {
        let mut gateway = MockForgeGateway::new();
        gateway.expect_list_pull_requests().returning(|_| Ok(PageResult::single(vec![])));

        let options = PullRequestGetOptions {
            repository: RepoRef::new("zchee", "ghctl"),
            markdown: false,
        };

        assert!(matches!(get(&context(gateway), &options).await, Err(CtlError::NotFoundError(_))));
    }
}
