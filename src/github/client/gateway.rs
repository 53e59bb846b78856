//! The only seam between `ghctl`'s commands and GitHub's REST API.
//!
//! Command handlers talk to a [`ForgeGateway`], never to octocrab directly, which keeps them testable against
//! a mocked gateway. [`OctocrabGateway`] is the real implementation, borrowing its clients from the managed
//! connection pool.
//!
//! Listing calls take a [`PageRequest`] and answer with a single [`PageResult`]; walking every page is the
//! [`PaginatedFetcher`](crate::github::utils::pagination::PaginatedFetcher)'s job.

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, trace};
use octocrab::Page;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use ghctl_lib::ghctl_trace_time;

use crate::config::{Permission, RepoListOptions, RepoRef};
use crate::ctl_error::CtlError;
use crate::github::client::connector::GitHubConnector;
use crate::github::client::pool::GitHubConnectionPool;
use crate::github::client::upstream::{classify, status_of};
use crate::github::json::invitation::Invitation;
use crate::github::json::pull_request::PullRequestSummary;
use crate::github::json::rate_limit::RateLimit;
use crate::github::json::release::{NewRelease, Release};
use crate::github::json::repository::Repository;
use crate::github::json::user::User;
use crate::github::utils::pagination::{PageRequest, PageResult};
use crate::nested;

/// Largest page size GitHub accepts.
pub const MAX_PER_PAGE: u8 = 100;

lazy_static! {
    static ref PAGE_PARAM: Regex = Regex::new(r"[?&]page=(\d+)").unwrap();
}

/// Listing options for `/user/repos` (no owner) or `/users/{owner}/repos`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RepositoryQuery {
    #[serde(skip)]
    pub owner: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

impl RepositoryQuery {
    /// GitHub rejects `type` together with `visibility` or `affiliation` on the authenticated user's
    /// endpoint, so `public`/`private` become a visibility there and an affiliation drops the type.
    pub fn from_options(options: &RepoListOptions) -> Self {
        let repo_type = options.repo_type.to_string();

        if options.owner.is_some() {
            return RepositoryQuery {
                owner: options.owner.clone(),
                repo_type: Some(repo_type),
                ..Default::default()
            };
        }

        let visibility = options.repo_type.as_visibility().map(str::to_string);
        let affiliation = options.affiliation.clone().filter(|a| !a.is_empty());
        let repo_type = if visibility.is_none() && affiliation.is_none() {
            Some(repo_type)
        } else {
            None
        };

        RepositoryQuery {
            owner: None,
            repo_type,
            visibility,
            affiliation,
        }
    }
}

/// Listing options for `/user/starred` (no username) or `/users/{username}/starred`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarredQuery {
    #[serde(skip)]
    pub username: Option<String>,
    pub sort: &'static str,
}

impl StarredQuery {
    pub fn new(username: Option<String>) -> Self {
        StarredQuery {
            username,
            sort: "created",
        }
    }
}

/// Issue search restricted to pull requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestSearch {
    pub q: String,
    pub sort: &'static str,
    pub order: &'static str,
}

/// Closed pull requests of a single repository, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestQuery {
    #[serde(skip)]
    pub repository: RepoRef,
    pub state: &'static str,
    pub sort: &'static str,
    pub direction: &'static str,
}

impl PullRequestQuery {
    pub fn closed(repository: RepoRef) -> Self {
        PullRequestQuery {
            repository,
            state: "closed",
            sort: "created",
            direction: "asc",
        }
    }
}

/// Pending invitations of the authenticated user take no filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InvitationQuery {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForgeGateway: Send + Sync {
    async fn authenticated_user(&self) -> Result<User, CtlError>;

    async fn list_repositories(
        &self, request: PageRequest<RepositoryQuery>,
    ) -> Result<PageResult<Repository>, CtlError>;

    async fn list_starred(&self, request: PageRequest<StarredQuery>) -> Result<PageResult<Repository>, CtlError>;

    async fn search_pull_requests(
        &self, request: PageRequest<PullRequestSearch>,
    ) -> Result<PageResult<PullRequestSummary>, CtlError>;

    async fn list_pull_requests(
        &self, request: PageRequest<PullRequestQuery>,
    ) -> Result<PageResult<PullRequestSummary>, CtlError>;

    async fn list_invitations(
        &self, request: PageRequest<InvitationQuery>,
    ) -> Result<PageResult<Invitation>, CtlError>;

    async fn accept_invitation(&self, invitation_id: u64) -> Result<(), CtlError>;

    /// `None` when `user` already is a collaborator (no invitation is issued then).
    async fn add_collaborator(
        &self, repository: &RepoRef, user: &str, permission: Permission,
    ) -> Result<Option<Invitation>, CtlError>;

    async fn delete_repository(&self, repository: &RepoRef) -> Result<(), CtlError>;

    async fn create_release(&self, repository: &RepoRef, release: &NewRelease) -> Result<Release, CtlError>;

    /// [`CtlError::NotFoundError`] when no release carries `tag`.
    async fn release_by_tag(&self, repository: &RepoRef, tag: &str) -> Result<Release, CtlError>;

    async fn delete_release(&self, repository: &RepoRef, release_id: u64) -> Result<(), CtlError>;

    async fn delete_tag(&self, repository: &RepoRef, tag: &str) -> Result<(), CtlError>;

    async fn rate_limit(&self) -> Result<RateLimit, CtlError>;
}

/// Query string of a listing call: the listing's own filters plus the page window.
#[derive(Serialize)]
struct Paged<'a, Q> {
    #[serde(flatten)]
    query: &'a Q,
    per_page: u8,
    page: u32,
}

/// `page` parameter of a `Link` header URL.
fn page_number<U: ToString>(link: &Option<U>) -> Option<u32> {
    let link = link.as_ref()?.to_string();
    PAGE_PARAM.captures(&link)?.get(1)?.as_str().parse().ok()
}

/// Without a `last` link the page count is unknown: `last_page` is then `current`, and a `next_page` beyond
/// it tells the fetcher to keep following `next` links.
fn to_page_result<T>(page: Page<T>, current: u32) -> PageResult<T> {
    let next_page = page_number(&page.next);
    let last_page = page_number(&page.last).unwrap_or(current).max(current);

    PageResult::new(page.items, last_page, next_page)
}

/// A missing release is reported as such instead of as a generic upstream failure.
fn release_lookup_error(error: octocrab::Error, repository: &RepoRef, tag: &str) -> CtlError {
    match status_of(&error) {
        Some(404) => CtlError::NotFoundError(format!(
            "{} release not found in {} repository",
            tag,
            repository.full_name()
        )),
        _ => classify(error, "could not get the release", &format!("{}/{}", repository, tag)),
    }
}

pub struct OctocrabGateway {
    connection_pool: GitHubConnectionPool,
    per_page: u8,
}

impl GitHubConnector for OctocrabGateway {
    fn get_connection_pool(&self) -> &GitHubConnectionPool {
        &self.connection_pool
    }
}

impl OctocrabGateway {
    pub fn new(connection_pool: GitHubConnectionPool) -> Self {
        OctocrabGateway {
            connection_pool,
            per_page: MAX_PER_PAGE,
        }
    }

    #[ghctl_trace_time]
    async fn get_page<T, Q>(
        &self, route: String, request: PageRequest<Q>, operation: &str, resource: &str,
    ) -> Result<PageResult<T>, CtlError>
    where
        T: DeserializeOwned + Send,
        Q: Serialize + Send + Sync,
    {
        trace!("Retrieving page [{}] of [{}]...", request.page(), route);

        let connection = self.get_github_client().await?;
        let parameters = Paged {
            query: request.options(),
            per_page: self.per_page,
            page: request.page(),
        };

        let page: Page<T> = connection
            .get(&route, Some(&parameters))
            .await
            .map_err(|e| classify(e, operation, resource))?;

        Ok(to_page_result(page, request.page()))
    }

    /// Runs a call answered with `204 No Content` (or any other success status without a useful body).
    #[ghctl_trace_time]
    async fn send_without_body(
        &self, method: http::Method, route: String, operation: &str, resource: &str,
    ) -> Result<(), CtlError> {
        debug!("{} [{}]...", method, route);

        let connection = self.get_github_client().await?;
        let response = match method {
            http::Method::DELETE => connection._delete(route.as_str(), None::<&()>).await,
            http::Method::PATCH => connection._patch(route.as_str(), None::<&()>).await,
            _ => connection._put(route.as_str(), None::<&()>).await,
        }
        .map_err(|e| classify(e, operation, resource))?;

        octocrab::map_github_error(response)
            .await
            .map_err(|e| classify(e, operation, resource))?;

        Ok(())
    }
}

#[async_trait]
impl ForgeGateway for OctocrabGateway {
    async fn authenticated_user(&self) -> Result<User, CtlError> {
        let connection = self.get_github_client().await?;

        connection
            .get("/user", None::<&()>)
            .await
            .map_err(|e| classify(e, "could not get the authenticated user", "/user"))
    }

    async fn list_repositories(
        &self, request: PageRequest<RepositoryQuery>,
    ) -> Result<PageResult<Repository>, CtlError> {
        let (route, resource) = match &request.options().owner {
            Some(owner) => (format!("/users/{}/repos", owner), owner.clone()),
            None => ("/user/repos".to_string(), "authenticated user".to_string()),
        };

        self.get_page(route, request, "could not list repositories", &resource).await
    }

    async fn list_starred(&self, request: PageRequest<StarredQuery>) -> Result<PageResult<Repository>, CtlError> {
        let (route, resource) = match &request.options().username {
            Some(username) => (format!("/users/{}/starred", username), username.clone()),
            None => ("/user/starred".to_string(), "authenticated user".to_string()),
        };

        self.get_page(route, request, "could not list starred repositories", &resource).await
    }

    async fn search_pull_requests(
        &self, request: PageRequest<PullRequestSearch>,
    ) -> Result<PageResult<PullRequestSummary>, CtlError> {
        let resource = request.options().q.clone();

        self.get_page(
            "/search/issues".to_string(),
            request,
            "could not get search pull request result",
            &resource,
        )
        .await
    }

    async fn list_pull_requests(
        &self, request: PageRequest<PullRequestQuery>,
    ) -> Result<PageResult<PullRequestSummary>, CtlError> {
        let repository = request.options().repository.clone();
        let route = format!("/repos/{}/{}/pulls", repository.owner, repository.name);

        self.get_page(
            route,
            request,
            "failed to get the list of pull requests",
            &repository.full_name(),
        )
        .await
    }

    async fn list_invitations(
        &self, request: PageRequest<InvitationQuery>,
    ) -> Result<PageResult<Invitation>, CtlError> {
        self.get_page(
            "/user/repository_invitations".to_string(),
            request,
            "could not list repository invitations",
            "authenticated user",
        )
        .await
    }

    async fn accept_invitation(&self, invitation_id: u64) -> Result<(), CtlError> {
        self.send_without_body(
            http::Method::PATCH,
            format!("/user/repository_invitations/{}", invitation_id),
            "could not accept the repository invitation",
            &invitation_id.to_string(),
        )
        .await
    }

    async fn add_collaborator(
        &self, repository: &RepoRef, user: &str, permission: Permission,
    ) -> Result<Option<Invitation>, CtlError> {
        let operation = "could not add the collaborator";
        let resource = repository.full_name();
        let route = format!("/repos/{}/{}/collaborators/{}", repository.owner, repository.name, user);
        let body = serde_json::json!({ "permission": permission.as_ref() });

        let connection = self.get_github_client().await?;
        let response = connection
            ._put(route.as_str(), Some(&body))
            .await
            .map_err(|e| classify(e, operation, &resource))?;
        let response = octocrab::map_github_error(response)
            .await
            .map_err(|e| classify(e, operation, &resource))?;

        if response.status() == http::StatusCode::NO_CONTENT {
            debug!("[{}] already is a collaborator of [{}].", user, resource);
            return Ok(None);
        }

        let raw_response_text = connection
            .body_to_string(response)
            .await
            .map_err(|e| classify(e, operation, &resource))?;

        let invitation: Invitation = serde_json::from_str(&raw_response_text).map_err(|e| {
            trace!("Raw response = {}", raw_response_text);
            CtlError::JsonSerializationError {
                msg: format!("Error mapping the invitation JSON for [{}].", resource),
                nested: nested!(e),
            }
        })?;

        Ok(Some(invitation))
    }

    async fn delete_repository(&self, repository: &RepoRef) -> Result<(), CtlError> {
        self.send_without_body(
            http::Method::DELETE,
            format!("/repos/{}/{}", repository.owner, repository.name),
            "could not delete the repository",
            &repository.full_name(),
        )
        .await
    }

    async fn create_release(&self, repository: &RepoRef, release: &NewRelease) -> Result<Release, CtlError> {
        let connection = self.get_github_client().await?;

        connection
            .post(
                format!("/repos/{}/{}/releases", repository.owner, repository.name),
                Some(release),
            )
            .await
            .map_err(|e| classify(e, "could not create the release", &repository.full_name()))
    }

    async fn release_by_tag(&self, repository: &RepoRef, tag: &str) -> Result<Release, CtlError> {
        let connection = self.get_github_client().await?;
        let route = format!("/repos/{}/{}/releases/tags/{}", repository.owner, repository.name, tag);

        connection
            .get(&route, None::<&()>)
            .await
            .map_err(|e| release_lookup_error(e, repository, tag))
    }

    async fn delete_release(&self, repository: &RepoRef, release_id: u64) -> Result<(), CtlError> {
        self.send_without_body(
            http::Method::DELETE,
            format!("/repos/{}/{}/releases/{}", repository.owner, repository.name, release_id),
            "could not delete the release",
            &format!("{}/{}", repository, release_id),
        )
        .await
    }

    async fn delete_tag(&self, repository: &RepoRef, tag: &str) -> Result<(), CtlError> {
        self.send_without_body(
            http::Method::DELETE,
            format!("/repos/{}/{}/git/refs/tags/{}", repository.owner, repository.name, tag),
            "could not delete the tag",
            &format!("{}/{}", repository, tag),
        )
        .await
    }

    async fn rate_limit(&self) -> Result<RateLimit, CtlError> {
        let connection = self.get_github_client().await?;

        connection
            .get("/rate_limit", None::<&()>)
            .await
            .map_err(|e| classify(e, "could not get the rate limit", "/rate_limit"))
    }
}
