//! Command line definition, and its translation into an [`Invocation`].
//!
//! Positional arguments are collected loosely and counted by hand (see [`check_args`]) so that a wrong
//! amount of them is reported as a [`CtlError::ArgumentCountError`] naming the command and its usage.

use std::str::FromStr;

use clap::builder::{PossibleValuesParser, RangedU64ValueParser};
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use log::LevelFilter;
use strum::VariantNames;

use crate::commands::Command;
use crate::config::{
    AcceptInvitationOptions, CollaboratorOptions, GlobalOptions, OutputFormat, Permission, PullRequestGetOptions,
    PullRequestListOptions, ReleaseCreateOptions, ReleaseDeleteOptions, RepoDeleteOptions, RepoListOptions,
    RepoOpenOptions, RepoRef, RepoTarget, RepoType, StarListOptions,
};
use crate::ctl_error::CtlError;
use crate::ctl_metadata;
use crate::github::utils::pagination::DEFAULT_CONCURRENCY;

// Commands ---
const REPO_CMD: &str = "repo";
const RELEASE_CMD: &str = "release";
const PR_CMD: &str = "pr";
const STAR_CMD: &str = "star";
const RATE_LIMIT_CMD: &str = "ratelimit";

const LIST_CMD: &str = "list";
const DELETE_CMD: &str = "delete";
const OPEN_CMD: &str = "open";
const COLLABORATOR_CMD: &str = "collaborator";
const ACCEPT_CMD: &str = "accept";
const CREATE_CMD: &str = "create";
const GET_CMD: &str = "get";

// CLI params ---
const ARGS_PARAM: &str = "args";
const TOKEN_PARAM: &str = "token";
const CONCURRENCY_PARAM: &str = "concurrency";
const LOG_LEVEL_PARAM: &str = "log-level";
const TYPE_PARAM: &str = "type";
const AFFILIATION_PARAM: &str = "affiliation";
const COLLABORATOR_PARAM: &str = "collaborator";
const PERMISSION_PARAM: &str = "permission";
const IGNORE_OWNER_PARAM: &str = "ignore-owner";
const IGNORE_REPO_PARAM: &str = "ignore-repo";

// CLI flags ---
const JSON_FLAG: &str = "json";
const SILENT_FLAG: &str = "silent";
const FORKED_FLAG: &str = "forked";
const DRAFT_FLAG: &str = "draft";
const PRERELEASE_FLAG: &str = "prerelease";
const WITH_TAG_FLAG: &str = "with-tag";
const FORCE_FLAG: &str = "force";
const REVERSE_FLAG: &str = "reverse";
const MARKDOWN_FLAG: &str = "markdown";
const ALL_FLAG: &str = "all";
const GIT_FLAG: &str = "git";

// Default values ---
const DEFAULT_REPO_TYPE: &str = "all";
const DEFAULT_PERMISSION: &str = "admin";

/// How many positional arguments a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsCheck {
    Exact,
    Min,
    Max,
}

impl ArgsCheck {
    fn requirement(&self) -> &'static str {
        match self {
            ArgsCheck::Exact => "exactly",
            ArgsCheck::Min => "a minimum of",
            ArgsCheck::Max => "a maximum of",
        }
    }

    fn accepts(&self, given: usize, expected: usize) -> bool {
        match self {
            ArgsCheck::Exact => given == expected,
            ArgsCheck::Min => given >= expected,
            ArgsCheck::Max => given <= expected,
        }
    }
}

/// Validates the amount of positional `args` given to `command`.
pub fn check_args(
    command: &str, args: &[String], expected: usize, check: ArgsCheck, usage: &str,
) -> Result<(), CtlError> {
    if check.accepts(args.len(), expected) {
        return Ok(());
    }

    Err(CtlError::ArgumentCountError {
        command: command.to_string(),
        requirement: check.requirement(),
        usage: usage.to_string(),
        expected,
    })
}

/// A fully parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub global: GlobalOptions,
    pub command: Command,
}

/// Sets up the CLI for the whole application.
pub fn setup_cli() -> ClapCommand {
    ClapCommand::new(ctl_metadata::package_name())
        .version(ctl_metadata::full_version())
        .author(ctl_metadata::authors())
        .about(ctl_metadata::description())
        .subcommand_required(true)
        .arg_required_else_help(true)
        // global params start here ---
        .arg(
            Arg::new(TOKEN_PARAM)
                .long(TOKEN_PARAM)
                .help("GitHub personal access token (GHCTL_TOKEN or GITHUB_TOKEN are used otherwise)")
                .action(ArgAction::Set)
                .global(true),
        )
        .arg(
            Arg::new(CONCURRENCY_PARAM)
                .long(CONCURRENCY_PARAM)
                .help("Maximum amount of concurrent page requests [default: 20]")
                .action(ArgAction::Set)
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
                .global(true),
        )
        .arg(
            Arg::new(LOG_LEVEL_PARAM)
                .long(LOG_LEVEL_PARAM)
                .short('L')
                .help("Overrides the logging verbosity for the whole application")
                .action(ArgAction::Set)
                .value_parser(PossibleValuesParser::new([
                    LevelFilter::Info.as_str(),
                    LevelFilter::Debug.as_str(),
                    LevelFilter::Trace.as_str(),
                    LevelFilter::Warn.as_str(),
                    LevelFilter::Error.as_str(),
                    LevelFilter::Off.as_str(),
                ]))
                .ignore_case(true)
                .default_value(ctl_metadata::default_log_level().as_str())
                .conflicts_with(SILENT_FLAG)
                .global(true),
        )
        // global flags start here ---
        .arg(
            Arg::new(JSON_FLAG)
                .long(JSON_FLAG)
                .help("Prints results in JSON format instead of plain text")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new(SILENT_FLAG)
                .long(SILENT_FLAG)
                .short('s')
                .help(
                    "Turns off all logging and the progress spinner, leaving only the results. (NOTE: this is \
                    automatically the case when stderr is not a terminal)",
                )
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(repo_cli())
        .subcommand(release_cli())
        .subcommand(pr_cli())
        .subcommand(star_cli())
        .subcommand(ClapCommand::new(RATE_LIMIT_CMD).about("Check your API rate limit"))
}

fn positional_args(value_name: &'static str) -> Arg {
    Arg::new(ARGS_PARAM).value_name(value_name).num_args(0..).action(ArgAction::Append)
}

fn repo_cli() -> ClapCommand {
    ClapCommand::new(REPO_CMD)
        .about("Manage repositories")
        .subcommand_required(true)
        .subcommand(
            ClapCommand::new(LIST_CMD)
                .about("List the repositories of a user or organization (the authenticated user by default)")
                .arg(positional_args("USERNAME|ORG"))
                .arg(
                    Arg::new(TYPE_PARAM)
                        .long(TYPE_PARAM)
                        .short('t')
                        .help("Type of repositories to list")
                        .action(ArgAction::Set)
                        .value_parser(PossibleValuesParser::new(RepoType::VARIANTS.iter().copied()))
                        .default_value(DEFAULT_REPO_TYPE),
                )
                .arg(
                    Arg::new(AFFILIATION_PARAM)
                        .long(AFFILIATION_PARAM)
                        .short('a')
                        .help("Comma separated list of affiliations [owner,collaborator,organization_member]")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new(FORKED_FLAG)
                        .long(FORKED_FLAG)
                        .help("Include forked repositories")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            ClapCommand::new(DELETE_CMD)
                .about("Delete a repository")
                .arg(positional_args("[OWNER/]REPOSITORY")),
        )
        .subcommand(
            ClapCommand::new(OPEN_CMD)
                .about("Open a repository in the browser")
                .arg(positional_args("[OWNER/]REPOSITORY")),
        )
        .subcommand(
            ClapCommand::new(COLLABORATOR_CMD)
                .about("Add a collaborator to a repository")
                .arg(positional_args("OWNER/REPOSITORY"))
                .arg(
                    Arg::new(COLLABORATOR_PARAM)
                        .long(COLLABORATOR_PARAM)
                        .help("Username of the collaborator")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new(PERMISSION_PARAM)
                        .long(PERMISSION_PARAM)
                        .help("Permission granted to the collaborator")
                        .action(ArgAction::Set)
                        .value_parser(PossibleValuesParser::new(Permission::VARIANTS.iter().copied()))
                        .default_value(DEFAULT_PERMISSION),
                ),
        )
        .subcommand(
            ClapCommand::new(ACCEPT_CMD)
                .about("Accept a repository collaboration invitation")
                .arg(positional_args("OWNER/REPOSITORY")),
        )
}

fn release_cli() -> ClapCommand {
    ClapCommand::new(RELEASE_CMD)
        .about("Manage releases")
        .subcommand_required(true)
        .subcommand(
            ClapCommand::new(CREATE_CMD)
                .about("Create a release from a tag")
                .arg(positional_args("OWNER REPO TAG"))
                .arg(Arg::new(DRAFT_FLAG).long(DRAFT_FLAG).help("Create a draft release").action(ArgAction::SetTrue))
                .arg(
                    Arg::new(PRERELEASE_FLAG)
                        .long(PRERELEASE_FLAG)
                        .help("Mark the release as a pre-release")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            ClapCommand::new(DELETE_CMD)
                .about("Delete the release of a tag")
                .arg(positional_args("OWNER REPO TAG"))
                .arg(
                    Arg::new(WITH_TAG_FLAG)
                        .long(WITH_TAG_FLAG)
                        .help("Delete the tag as well")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new(FORCE_FLAG)
                        .long(FORCE_FLAG)
                        .short('f')
                        .help("Do not ask for confirmation")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn markdown_flag() -> Arg {
    Arg::new(MARKDOWN_FLAG)
        .long(MARKDOWN_FLAG)
        .short('m')
        .help("Output markdown syntax")
        .action(ArgAction::SetTrue)
}

fn pr_cli() -> ClapCommand {
    ClapCommand::new(PR_CMD)
        .about("Manage pull requests")
        .subcommand_required(true)
        .subcommand(
            ClapCommand::new(LIST_CMD)
                .about("List the pull requests you sent")
                .arg(positional_args("OWNER|OWNER/REPO"))
                .arg(
                    Arg::new(IGNORE_OWNER_PARAM)
                        .long(IGNORE_OWNER_PARAM)
                        .help("Ignore the repositories of these owners")
                        .action(ArgAction::Append)
                        .value_delimiter(','),
                )
                .arg(
                    Arg::new(IGNORE_REPO_PARAM)
                        .long(IGNORE_REPO_PARAM)
                        .help("Ignore these repositories")
                        .action(ArgAction::Append)
                        .value_delimiter(','),
                )
                .arg(Arg::new(REVERSE_FLAG).long(REVERSE_FLAG).help("Reverse the sort order").action(ArgAction::SetTrue))
                .arg(markdown_flag())
                .arg(
                    Arg::new(ALL_FLAG)
                        .long(ALL_FLAG)
                        .short('a')
                        .help("Include open pull requests (only merged/closed ones by default)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            ClapCommand::new(GET_CMD)
                .about("Get the closed pull requests of a repository")
                .arg(positional_args("OWNER REPO"))
                .arg(markdown_flag()),
        )
}

fn star_cli() -> ClapCommand {
    ClapCommand::new(STAR_CMD)
        .about("Manage stars")
        .subcommand_required(true)
        .subcommand(
            ClapCommand::new(LIST_CMD)
                .about("List the starred repositories of a user (the authenticated user by default)")
                .arg(positional_args("USERNAME"))
                .arg(
                    Arg::new(GIT_FLAG)
                        .long(GIT_FLAG)
                        .help("Print git URLs instead of HTML URLs")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn args_of(matches: &ArgMatches) -> Vec<String> {
    matches.get_many::<String>(ARGS_PARAM).map(|values| values.cloned().collect()).unwrap_or_default()
}

fn strings_of(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.filter(|v| !v.is_empty()).cloned().collect())
        .unwrap_or_default()
}

fn parse_value<T: FromStr>(matches: &ArgMatches, id: &str) -> Result<T, CtlError> {
    let value = matches
        .get_one::<String>(id)
        .ok_or_else(|| CtlError::InvalidArgumentError(format!("missing value for --{}", id)))?;

    value
        .parse()
        .map_err(|_| CtlError::InvalidArgumentError(format!("invalid value [{}] for --{}", value, id)))
}

fn global_options(matches: &ArgMatches) -> Result<GlobalOptions, CtlError> {
    let silent = matches.get_flag(SILENT_FLAG);
    let log_level = if silent {
        LevelFilter::Off
    } else {
        parse_value::<LevelFilter>(matches, LOG_LEVEL_PARAM)?
    };

    Ok(GlobalOptions {
        token: matches.get_one::<String>(TOKEN_PARAM).cloned(),
        concurrency: matches.get_one::<usize>(CONCURRENCY_PARAM).copied().unwrap_or(DEFAULT_CONCURRENCY),
        output: if matches.get_flag(JSON_FLAG) {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        silent,
        log_level,
    })
}

/// Translates parsed arguments into an [`Invocation`], validating positional arguments on the way.
pub fn parse(matches: &ArgMatches) -> Result<Invocation, CtlError> {
    let global = global_options(matches)?;

    let command = match matches.subcommand() {
        Some((REPO_CMD, repo)) => parse_repo(repo)?,
        Some((RELEASE_CMD, release)) => parse_release(release)?,
        Some((PR_CMD, pr)) => parse_pr(pr)?,
        Some((STAR_CMD, star)) => parse_star(star)?,
        Some((RATE_LIMIT_CMD, _)) => Command::RateLimit,
        _ => return Err(unknown_command(matches)),
    };

    Ok(Invocation { global, command })
}

fn unknown_command(matches: &ArgMatches) -> CtlError {
    CtlError::InvalidArgumentError(format!(
        "unknown command [{}]",
        matches.subcommand_name().unwrap_or_default()
    ))
}

fn parse_repo(matches: &ArgMatches) -> Result<Command, CtlError> {
    let command = match matches.subcommand() {
        Some((LIST_CMD, list)) => {
            let args = args_of(list);
            check_args(LIST_CMD, &args, 1, ArgsCheck::Max, "<username|orgs>")?;

            Command::RepoList(RepoListOptions {
                owner: args.into_iter().next(),
                repo_type: parse_value(list, TYPE_PARAM)?,
                affiliation: list.get_one::<String>(AFFILIATION_PARAM).cloned(),
                include_forked: list.get_flag(FORKED_FLAG),
            })
        }
        Some((DELETE_CMD, delete)) => {
            let args = args_of(delete);
            check_args(DELETE_CMD, &args, 1, ArgsCheck::Exact, "<repository>")?;

            Command::RepoDelete(RepoDeleteOptions {
                target: args[0].parse::<RepoTarget>()?,
            })
        }
        Some((OPEN_CMD, open)) => {
            let args = args_of(open);
            check_args(OPEN_CMD, &args, 1, ArgsCheck::Exact, "<username/repository>")?;

            Command::RepoOpen(RepoOpenOptions {
                target: args[0].parse::<RepoTarget>()?,
            })
        }
        Some((COLLABORATOR_CMD, collaborator)) => {
            let args = args_of(collaborator);
            check_args(COLLABORATOR_CMD, &args, 1, ArgsCheck::Exact, "<owner/repository>")?;

            let user = collaborator
                .get_one::<String>(COLLABORATOR_PARAM)
                .map(|user| user.trim().to_string())
                .filter(|user| !user.is_empty())
                .ok_or_else(|| CtlError::InvalidArgumentError("--collaborator flag must be not empty".to_string()))?;

            Command::RepoCollaborator(CollaboratorOptions {
                repository: args[0].parse::<RepoRef>()?,
                collaborator: user,
                permission: parse_value(collaborator, PERMISSION_PARAM)?,
            })
        }
        Some((ACCEPT_CMD, accept)) => {
            let args = args_of(accept);
            check_args(ACCEPT_CMD, &args, 1, ArgsCheck::Exact, "<owner/repository>")?;

            Command::RepoAccept(AcceptInvitationOptions {
                repository: args[0].parse::<RepoRef>()?,
            })
        }
        _ => return Err(unknown_command(matches)),
    };

    Ok(command)
}

fn owner_repo_tag(command: &str, matches: &ArgMatches) -> Result<(RepoRef, String), CtlError> {
    let args = args_of(matches);
    check_args(command, &args, 3, ArgsCheck::Exact, "<owner> <repo> <tag>")?;

    Ok((RepoRef::new(&args[0], &args[1]), args[2].clone()))
}

fn parse_release(matches: &ArgMatches) -> Result<Command, CtlError> {
    let command = match matches.subcommand() {
        Some((CREATE_CMD, create)) => {
            let (repository, tag) = owner_repo_tag(CREATE_CMD, create)?;

            Command::ReleaseCreate(ReleaseCreateOptions {
                repository,
                tag,
                draft: create.get_flag(DRAFT_FLAG),
                prerelease: create.get_flag(PRERELEASE_FLAG),
            })
        }
        Some((DELETE_CMD, delete)) => {
            let (repository, tag) = owner_repo_tag(DELETE_CMD, delete)?;

            Command::ReleaseDelete(ReleaseDeleteOptions {
                repository,
                tag,
                with_tag: delete.get_flag(WITH_TAG_FLAG),
                force: delete.get_flag(FORCE_FLAG),
            })
        }
        _ => return Err(unknown_command(matches)),
    };

    Ok(command)
}

fn parse_pr(matches: &ArgMatches) -> Result<Command, CtlError> {
    let command = match matches.subcommand() {
        Some((LIST_CMD, list)) => Command::PullRequestList(PullRequestListOptions {
            scopes: args_of(list),
            ignore_owners: strings_of(list, IGNORE_OWNER_PARAM),
            ignore_repos: strings_of(list, IGNORE_REPO_PARAM),
            reverse: list.get_flag(REVERSE_FLAG),
            markdown: list.get_flag(MARKDOWN_FLAG),
            all: list.get_flag(ALL_FLAG),
        }),
        Some((GET_CMD, get)) => {
            let args = args_of(get);
            check_args(GET_CMD, &args, 2, ArgsCheck::Exact, "<owner> <repo>")?;

            Command::PullRequestGet(PullRequestGetOptions {
                repository: RepoRef::new(&args[0], &args[1]),
                markdown: get.get_flag(MARKDOWN_FLAG),
            })
        }
        _ => return Err(unknown_command(matches)),
    };

    Ok(command)
}

fn parse_star(matches: &ArgMatches) -> Result<Command, CtlError> {
    match matches.subcommand() {
        Some((LIST_CMD, list)) => {
            let args = args_of(list);
            check_args(LIST_CMD, &args, 1, ArgsCheck::Max, "[username]")?;

            Ok(Command::StarList(StarListOptions {
                username: args.into_iter().next(),
                git_url: list.get_flag(GIT_FLAG),
            }))
        }
        _ => Err(unknown_command(matches)),
    }
}
