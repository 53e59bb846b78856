//! `repo` subcommands.

use std::sync::Arc;

use itertools::Itertools;
use log::{debug, info};

use crate::browser::GITHUB_WEB_URL;
use crate::commands::{lines, to_json, CommandContext};
use crate::config::{
    AcceptInvitationOptions, CollaboratorOptions, RepoDeleteOptions, RepoListOptions, RepoOpenOptions,
};
use crate::ctl_error::CtlError;
use crate::github::client::gateway::{InvitationQuery, RepositoryQuery};
use crate::github::json::repository::Repository;

/// Repositories of a user or organization (the authenticated user by default), sorted by URL.
pub async fn list(ctx: &CommandContext, options: &RepoListOptions) -> Result<String, CtlError> {
    let gateway = Arc::clone(&ctx.gateway);
    let repositories = ctx
        .fetcher()
        .fetch_all(RepositoryQuery::from_options(options), move |request| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.list_repositories(request).await }
        })
        .await;
    ctx.spin.flush();

    let repositories = repositories?;
    debug!("Listed [{}] repositories.", repositories.len());

    // an owner with nothing but forks still has repositories; only an empty listing is an error
    if repositories.is_empty() {
        let user = match &options.owner {
            Some(owner) => owner.clone(),
            None => ctx.authenticated_login().await?,
        };
        return Err(CtlError::NotFoundError(format!(
            "{} user have not {:?} repository",
            user,
            options.repo_type.as_ref()
        )));
    }

    let repositories: Vec<Repository> = repositories
        .into_iter()
        .filter(|repository| options.include_forked || !repository.fork)
        .sorted_by(|a, b| a.html_url.as_str().cmp(b.html_url.as_str()))
        .collect();

    if ctx.is_json() {
        return to_json(&repositories);
    }
    Ok(lines(repositories.iter().map(|repository| repository.html_url.as_str())))
}

pub async fn delete(ctx: &CommandContext, options: &RepoDeleteOptions) -> Result<String, CtlError> {
    let repository = ctx.resolve_target(&options.target).await?;

    ctx.confirm(&format!("remove repository {:?}? (y,n) ", repository.full_name()))?;

    ctx.spin.tick_while("deleting", ctx.gateway.delete_repository(&repository)).await?;
    info!("Deleted [{}].", repository);

    Ok(format!("Deleted {} repository", repository))
}

/// Opens the repository page in the browser, once GitHub confirms it exists.
pub async fn open(ctx: &CommandContext, options: &RepoOpenOptions) -> Result<String, CtlError> {
    let repository = ctx.resolve_target(&options.target).await?;
    let url = format!("{}/{}", GITHUB_WEB_URL, repository);

    if !ctx.browser.is_reachable(&url).await? {
        return Err(CtlError::NotFoundError(format!("failed http request: {}", url)));
    }
    ctx.browser.open(&url)?;

    Ok(String::new())
}

pub async fn add_collaborator(ctx: &CommandContext, options: &CollaboratorOptions) -> Result<String, CtlError> {
    let invitation = ctx
        .gateway
        .add_collaborator(&options.repository, &options.collaborator, options.permission)
        .await?
        .ok_or_else(|| CtlError::AlreadyCollaboratorError {
            user: options.collaborator.clone(),
            repository: options.repository.full_name(),
        })?;

    if ctx.is_json() {
        return to_json(&invitation);
    }
    Ok(format!(
        "added {} user to {} collaborator\n\tid: {}",
        options.collaborator, options.repository, invitation.id
    ))
}

/// Accepts the pending invitation to collaborate on the given repository.
pub async fn accept_invitation(
    ctx: &CommandContext, options: &AcceptInvitationOptions,
) -> Result<String, CtlError> {
    let gateway = Arc::clone(&ctx.gateway);
    let invitations = ctx
        .fetcher()
        .fetch_all(InvitationQuery::default(), move |request| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.list_invitations(request).await }
        })
        .await;
    ctx.spin.flush();

    let full_name = options.repository.full_name();
    let invitation = invitations?
        .into_iter()
        .find(|invitation| invitation.repository.full_name.eq_ignore_ascii_case(&full_name))
        .ok_or_else(|| CtlError::NotFoundError(format!("not found {} repository invitation", full_name)))?;

    ctx.gateway.accept_invitation(invitation.id).await?;

    Ok(format!("accepted {} invitation ID from {} repository", invitation.id, full_name))
}
