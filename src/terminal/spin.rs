//! A one-line progress spinner drawn on stderr.
//!
//! Each [`Spin::next`] call redraws the line as `<label> <frame> <detail>`; [`Spin::flush`] wipes it once
//! the work is done so that stdout results are never interleaved with spinner leftovers.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::trace;

const TEMPLATE: &str = "{prefix:.blue} {spinner} {msg}";

const TICK_CHARS: &str = "|/-\\ ";

const TICK_INTERVAL: Duration = Duration::from_millis(120);

pub struct Spin {
    enabled: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl Spin {
    /// A disabled spinner never writes anything (silent mode, or stderr not attended by a user).
    pub fn new(enabled: bool) -> Self {
        Spin {
            enabled,
            bar: Mutex::new(None),
        }
    }

    /// Advances the spinner by one frame.
    pub fn next(&self, label: &str, detail: &str) {
        let mut slot = self.slot();
        let bar = slot.get_or_insert_with(|| self.start());

        bar.set_prefix(label.to_string());
        bar.set_message(detail.to_string());
        bar.tick();
    }

    /// Clears the spinner line. The next call to [`Spin::next`] starts a fresh spinner.
    pub fn flush(&self) {
        if let Some(bar) = self.slot().take() {
            bar.finish_and_clear();
        }
    }

    /// Keeps the spinner turning until `future` completes.
    pub async fn tick_while<F: Future>(&self, label: &str, future: F) -> F::Output {
        {
            let mut slot = self.slot();
            let bar = slot.get_or_insert_with(|| self.start());
            bar.set_prefix(label.to_string());
            bar.set_message("");
            bar.enable_steady_tick(TICK_INTERVAL);
        }

        let output = future.await;
        self.flush();
        output
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        match self.bar.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn start(&self) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if !self.enabled {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }

        let style = match ProgressStyle::default_spinner().template(TEMPLATE) {
            Ok(style) => style.tick_chars(TICK_CHARS),
            Err(e) => {
                trace!("Could not parse the spinner template, using the default one. Error = {}", e);
                ProgressStyle::default_spinner()
            }
        };
        bar.set_style(style);
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_spinner_still_yields_the_wrapped_output() {
        let spin = Spin::new(false);

        let output = spin.tick_while("deleting", async { 42 }).await;

        assert_eq!(output, 42);
        assert!(spin.slot().is_none());
    }

    #[test]
    fn next_shows_the_label_and_detail() {
        let spin = Spin::new(false);
        spin.next("fetching", "page: 1/4");
        spin.next("fetching", "page: 2/4");

        let slot = spin.slot();
        let bar = slot.as_ref().unwrap();
        assert_eq!(bar.prefix(), "fetching");
        assert_eq!(bar.message(), "page: 2/4");
    }

    #[test]
    fn flush_makes_room_for_a_fresh_spinner() {
        let spin = Spin::new(false);
        spin.next("fetching", "page: 4/4");
        spin.flush();
        assert!(spin.slot().is_none());

        spin.next("fetching", "page: 1/2");
        assert_eq!(spin.slot().as_ref().unwrap().message(), "page: 1/2");
    }
}
