//! Explicit configuration for every `ghctl` command.
//!
//! Flag parsing fills these structs exactly once (see [`cli`](crate::cli)); handlers only ever receive
//! them by reference.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::LevelFilter;
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString, VariantNames};

use crate::ctl_error::CtlError;

/// Options shared by all commands.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalOptions {
    /// Token given through `--token`; environment variables are consulted when absent.
    pub token: Option<String>,
    /// Maximum amount of in-flight page requests.
    pub concurrency: usize,
    pub output: OutputFormat,
    pub silent: bool,
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// `type` filter for repository listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay, AsRefStr, EnumIter, VariantNames,
)]
#[strum(serialize_all = "lowercase")]
pub enum RepoType {
    All,
    Owner,
    Public,
    Private,
    Member,
}

impl RepoType {
    /// `public` and `private` are visibilities as far as the authenticated-user endpoint is concerned.
    pub fn as_visibility(&self) -> Option<&'static str> {
        match self {
            RepoType::Public => Some("public"),
            RepoType::Private => Some("private"),
            _ => None,
        }
    }
}

/// Permission granted to a new collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay, AsRefStr, EnumIter, VariantNames,
)]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

/// `<owner>/<repository>` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Self {
        RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl Display for RepoRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = CtlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoRef::new(owner, name))
            }
            _ => Err(CtlError::InvalidArgumentError(format!(
                "expected <owner>/<repository>, got [{}]",
                value
            ))),
        }
    }
}

/// A repository given either as `<owner>/<repository>` or as a bare name belonging to the
/// authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoTarget {
    Qualified(RepoRef),
    OwnedByViewer(String),
}

impl FromStr for RepoTarget {
    type Err = CtlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.contains('/') {
            return value.parse().map(RepoTarget::Qualified);
        }
        if value.is_empty() {
            return Err(CtlError::InvalidArgumentError(
                "repository name must not be empty".to_string(),
            ));
        }
        Ok(RepoTarget::OwnedByViewer(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoListOptions {
    /// User or organization; the authenticated user when absent.
    pub owner: Option<String>,
    pub repo_type: RepoType,
    pub affiliation: Option<String>,
    pub include_forked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoDeleteOptions {
    pub target: RepoTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoOpenOptions {
    pub target: RepoTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollaboratorOptions {
    pub repository: RepoRef,
    pub collaborator: String,
    pub permission: Permission,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptInvitationOptions {
    pub repository: RepoRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseCreateOptions {
    pub repository: RepoRef,
    pub tag: String,
    pub draft: bool,
    pub prerelease: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDeleteOptions {
    pub repository: RepoRef,
    pub tag: String,
    pub with_tag: bool,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestListOptions {
    /// `owner` or `owner/repo` qualifiers narrowing the search.
    pub scopes: Vec<String>,
    pub ignore_owners: Vec<String>,
    pub ignore_repos: Vec<String>,
    pub reverse: bool,
    pub markdown: bool,
    /// Include open pull requests too (merged/closed only by default).
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestGetOptions {
    pub repository: RepoRef,
    pub markdown: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarListOptions {
    /// The authenticated user when absent.
    pub username: Option<String>,
    pub git_url: bool,
}

#[cfg(test)]
mod tests {
    use strum::{IntoEnumIterator, VariantNames};

    use super::*;

    #[test]
    fn repo_ref_requires_owner_and_name() {
        assert_eq!("zchee/ghctl".parse::<RepoRef>().unwrap(), RepoRef::new("zchee", "ghctl"));
        assert!("zchee".parse::<RepoRef>().is_err());
        assert!("zchee/".parse::<RepoRef>().is_err());
        assert!("/ghctl".parse::<RepoRef>().is_err());
        assert!("a/b/c".parse::<RepoRef>().is_err());
    }

    #[test]
    fn bare_names_target_the_authenticated_user() {
        assert_eq!(
            "ghctl".parse::<RepoTarget>().unwrap(),
            RepoTarget::OwnedByViewer("ghctl".to_string())
        );
        assert_eq!(
            "zchee/ghctl".parse::<RepoTarget>().unwrap(),
            RepoTarget::Qualified(RepoRef::new("zchee", "ghctl"))
        );
        assert!("".parse::<RepoTarget>().is_err());
    }

    #[test]
    fn flag_values_round_trip_through_strum() {
        for repo_type in RepoType::iter() {
            assert_eq!(repo_type.to_string().parse::<RepoType>().unwrap(), repo_type);
        }
        assert_eq!(RepoType::VARIANTS, &["all", "owner", "public", "private", "member"]);
        assert_eq!(Permission::Maintain.as_ref(), "maintain");
    }

    #[test]
    fn only_public_and_private_map_to_visibilities() {
        assert_eq!(RepoType::Public.as_visibility(), Some("public"));
        assert_eq!(RepoType::Private.as_visibility(), Some("private"));
        assert_eq!(RepoType::Member.as_visibility(), None);
    }
}
