//! User interrupt handling.

use console::Term;
use log::warn;
use tokio_util::sync::CancellationToken;

/// Exit status of a forced quit (128 + SIGINT).
const FORCE_QUIT_STATUS: i32 = 130;

/// The first Ctrl+C cancels `cancellation`, letting running operations wind down; a second one quits at once.
pub fn install_interrupt_handler(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl+C; interrupts will not be graceful. Error = {}", e);
            return;
        }

        if Term::stderr().is_term() {
            eprintln!("\ninterrupted, cancelling... (press Ctrl+C again to force quit)");
        }
        cancellation.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(FORCE_QUIT_STATUS);
        }
    });
}
