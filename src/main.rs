use std::process;
use std::sync::Arc;

use console::Term;
use log::{debug, error, warn, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TerminalMode};
use tokio_util::sync::CancellationToken;

use crate::browser::SystemBrowser;
use crate::cli::Invocation;
use crate::commands::CommandContext;
use crate::ctl_error::CtlError;
use crate::github::client::gateway::OctocrabGateway;
use crate::github::client::pool::{build_connection_pool, GitHubConnectionPoolManager};
use crate::github::client::token::resolve_token;
use crate::terminal::prompt::TermPrompter;
use crate::terminal::spin::Spin;

#[path = "error.rs"]
mod ctl_error;

#[path = "metadata.rs"]
mod ctl_metadata;

mod browser;

mod cli;

mod commands;

mod config;

mod github;

mod shutdown;

mod terminal;

/// Exit status of any failed command.
const FAILURE_STATUS: i32 = 1;

#[tokio::main]
async fn main() {
    // initialize CLI access; clap exits by itself on malformed flags ---
    let matches = cli::setup_cli().get_matches();

    let invocation = cli::parse(&matches).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(FAILURE_STATUS)
    });

    // determine if stderr is user attended or not (ie: it's being redirected into a file) ---
    let silent_mode = invocation.global.silent || !Term::stderr().is_term();

    // automatically turn off all logs if stderr is unattended
    init_logging(if silent_mode { LevelFilter::Off } else { invocation.global.log_level });

    match execute(&invocation, silent_mode).await {
        Ok(output) => {
            if !output.is_empty() {
                if let Err(e) = Term::stdout().write_line(&output) {
                    error!("Could not write results to stdout. Error = {}", e);
                    process::exit(FAILURE_STATUS);
                }
            }
        }
        Err(e) if e.is_cancellation() => {
            // interrupting or declining is the user's call, not a failure
            eprintln!("{}", e);
        }
        Err(e) => {
            error!("Command failed: {:?}", invocation.command);
            eprintln!("{}", e);
            process::exit(FAILURE_STATUS);
        }
    }
}

/// Wires up GitHub's connection pool and the terminal collaborators, then runs the invoked command.
async fn execute(invocation: &Invocation, silent_mode: bool) -> Result<String, CtlError> {
    let global = &invocation.global;

    let token = resolve_token(global.token.as_deref());
    if token.is_none() {
        warn!("No GitHub token found; falling back to unauthenticated (and heavily rate-limited) access.");
    }

    // one client per in-flight page request, and never more than that ---
    let connection_pool = build_connection_pool(GitHubConnectionPoolManager::new(token), global.concurrency)?;
    debug!("GitHub connection pool ready for up to [{}] concurrent requests.", global.concurrency);

    let cancellation = CancellationToken::new();
    shutdown::install_interrupt_handler(cancellation.clone());

    let ctx = CommandContext {
        gateway: Arc::new(OctocrabGateway::new(connection_pool)),
        prompter: Arc::new(TermPrompter::new()),
        browser: Arc::new(SystemBrowser::new()),
        spin: Arc::new(Spin::new(!silent_mode)),
        cancellation,
        concurrency: global.concurrency,
        output: global.output,
    };

    commands::run(&invocation.command, &ctx).await
}

/// Initializes the `Log` crate's logging facade.
fn init_logging(log_level: LevelFilter) {
    let result = simplelog::TermLogger::init(
        log_level,
        ConfigBuilder::new().add_filter_allow_str(ctl_metadata::package_name()).build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    if let Err(e) = result {
        eprintln!("Could not initialize logging; continuing without it. Error = {}", e);
    }
}
