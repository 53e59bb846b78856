//! Command handlers.
//!
//! Every handler receives its already-parsed options and a [`CommandContext`], and answers with the text to
//! be printed on stdout. Nothing is printed while a command is still able to fail, so a failed command never
//! leaves partial results behind.

use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::browser::Browser;
use crate::config::{
    AcceptInvitationOptions, CollaboratorOptions, OutputFormat, PullRequestGetOptions, PullRequestListOptions,
    ReleaseCreateOptions, ReleaseDeleteOptions, RepoDeleteOptions, RepoListOptions, RepoOpenOptions, RepoRef,
    RepoTarget, StarListOptions,
};
use crate::ctl_error::CtlError;
use crate::github::client::gateway::ForgeGateway;
use crate::github::utils::pagination::PaginatedFetcher;
use crate::nested;
use crate::terminal::prompt::Prompter;
use crate::terminal::spin::Spin;

pub mod pull_request;
pub mod rate_limit;
pub mod release;
pub mod repo;
pub mod star;

/// Label shown by the spinner while pages are being fetched.
const FETCH_LABEL: &str = "fetching";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RepoList(RepoListOptions),
    RepoDelete(RepoDeleteOptions),
    RepoOpen(RepoOpenOptions),
    RepoCollaborator(CollaboratorOptions),
    RepoAccept(AcceptInvitationOptions),
    ReleaseCreate(ReleaseCreateOptions),
    ReleaseDelete(ReleaseDeleteOptions),
    PullRequestList(PullRequestListOptions),
    PullRequestGet(PullRequestGetOptions),
    StarList(StarListOptions),
    RateLimit,
}

/// Collaborators shared by all handlers.
pub struct CommandContext {
    pub gateway: Arc<dyn ForgeGateway>,
    pub prompter: Arc<dyn Prompter>,
    pub browser: Arc<dyn Browser>,
    pub spin: Arc<Spin>,
    pub cancellation: CancellationToken,
    pub concurrency: usize,
    pub output: OutputFormat,
}

impl CommandContext {
    /// A fetcher reporting its progress through the spinner.
    pub fn fetcher(&self) -> PaginatedFetcher {
        let spin = Arc::clone(&self.spin);

        PaginatedFetcher::new(self.concurrency, self.cancellation.clone()).with_progress(Arc::new(
            move |done: u32, total: u32| spin.next(FETCH_LABEL, &format!("page: {}/{}", done, total)),
        ))
    }

    pub async fn authenticated_login(&self) -> Result<String, CtlError> {
        Ok(self.gateway.authenticated_user().await?.login)
    }

    /// Qualifies bare repository names with the authenticated user's login.
    pub async fn resolve_target(&self, target: &RepoTarget) -> Result<RepoRef, CtlError> {
        match target {
            RepoTarget::Qualified(repository) => Ok(repository.clone()),
            RepoTarget::OwnedByViewer(name) => Ok(RepoRef::new(&self.authenticated_login().await?, name)),
        }
    }

    /// Asks for confirmation; anything but agreement cancels the command.
    pub fn confirm(&self, question: &str) -> Result<(), CtlError> {
        if self.prompter.confirm(question)? {
            Ok(())
        } else {
            Err(CtlError::CancelledError("declined confirmation".to_string()))
        }
    }

    pub fn is_json(&self) -> bool {
        self.output == OutputFormat::Json
    }
}

/// Runs `command`, answering with what should be printed on stdout.
pub async fn run(command: &Command, ctx: &CommandContext) -> Result<String, CtlError> {
    match command {
        Command::RepoList(options) => repo::list(ctx, options).await,
        Command::RepoDelete(options) => repo::delete(ctx, options).await,
        Command::RepoOpen(options) => repo::open(ctx, options).await,
        Command::RepoCollaborator(options) => repo::add_collaborator(ctx, options).await,
        Command::RepoAccept(options) => repo::accept_invitation(ctx, options).await,
        Command::ReleaseCreate(options) => release::create(ctx, options).await,
        Command::ReleaseDelete(options) => release::delete(ctx, options).await,
        Command::PullRequestList(options) => pull_request::list(ctx, options).await,
        Command::PullRequestGet(options) => pull_request::get(ctx, options).await,
        Command::StarList(options) => star::list(ctx, options).await,
        Command::RateLimit => rate_limit::show(ctx).await,
    }
}

/// Pretty-printed JSON rendition of `value`.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CtlError> {
    serde_json::to_string_pretty(value).map_err(|e| CtlError::JsonSerializationError {
        msg: "could not marshal to JSON".to_string(),
        nested: nested!(e),
    })
}

/// One output line per item.
pub fn lines<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    items.into_iter().join("\n")
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the handlers' tests.

    use std::sync::Arc;

    use reqwest::Url;
    use tokio_util::sync::CancellationToken;

    use crate::browser::MockBrowser;
    use crate::config::OutputFormat;
    use crate::github::client::gateway::MockForgeGateway;
    use crate::github::json::repository::Repository;
    use crate::github::json::user::User;
    use crate::terminal::prompt::MockPrompter;
    use crate::terminal::spin::Spin;

    use super::CommandContext;

    pub fn context(gateway: MockForgeGateway) -> CommandContext {
        context_with(gateway, MockPrompter::new(), MockBrowser::new(), OutputFormat::Text)
    }

    pub fn context_with(
        gateway: MockForgeGateway, prompter: MockPrompter, browser: MockBrowser, output: OutputFormat,
    ) -> CommandContext {
        CommandContext {
            gateway: Arc::new(gateway),
            prompter: Arc::new(prompter),
            browser: Arc::new(browser),
            spin: Arc::new(Spin::new(false)),
            cancellation: CancellationToken::new(),
            concurrency: 4,
            output,
        }
    }

    pub fn user(login: &str) -> User {
        User {
            login: login.to_string(),
            id: 1,
        }
    }

    pub fn repository(full_name: &str, fork: bool) -> Repository {
        let (owner, name) = full_name.split_once('/').unwrap();

        Repository {
            id: 1,
            name: name.to_string(),
            full_name: full_name.to_string(),
            html_url: Url::parse(&format!("https://github.com/{}", full_name)).unwrap(),
            git_url: Some(format!("git://github.com/{}.git", full_name)),
            fork,
            private: false,
            description: None,
            owner: Some(user(owner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::github::client::gateway::MockForgeGateway;
    use crate::terminal::prompt::MockPrompter;
    use crate::browser::MockBrowser;

    #[tokio::test]
    async fn bare_targets_belong_to_the_authenticated_user() {
        let mut gateway = MockForgeGateway::new();
        gateway.expect_authenticated_user().times(1).returning(|| Ok(user("zchee")));
        let ctx = context(gateway);

        let qualified = ctx.resolve_target(&RepoTarget::Qualified(RepoRef::new("rust-lang", "rust"))).await;
        let bare = ctx.resolve_target(&RepoTarget::OwnedByViewer("ghctl".to_string())).await;

        assert_eq!(qualified.unwrap(), RepoRef::new("rust-lang", "rust"));
        assert_eq!(bare.unwrap(), RepoRef::new("zchee", "ghctl"));
    }

    #[test]
    fn declined_confirmations_cancel() {
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().returning(|_| Ok(false));
        let ctx = context_with(MockForgeGateway::new(), prompter, MockBrowser::new(), OutputFormat::Text);

        assert!(ctx.confirm("remove repository \"zchee/ghctl\"? (y,n) ").unwrap_err().is_cancellation());
    }

    #[test]
    fn lines_are_joined_without_trailing_newline() {
        assert_eq!(lines(vec!["a", "b"]), "a\nb");
        assert_eq!(lines(Vec::<String>::new()), "");
    }
}
