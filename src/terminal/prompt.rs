//! `(y,n)` confirmations before destructive operations.

use console::Term;
use log::debug;

use crate::ctl_error::CtlError;
use crate::nested;

#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Asks `question` and reports whether the user agreed.
    fn confirm(&self, question: &str) -> Result<bool, CtlError>;
}

/// Only a literal `y` counts as agreement.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim() == "y"
}

/// Prompts on stderr and reads the answer from the terminal.
pub struct TermPrompter {
    term: Term,
}

impl TermPrompter {
    pub fn new() -> Self {
        TermPrompter { term: Term::stderr() }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        TermPrompter::new()
    }
}

impl Prompter for TermPrompter {
    fn confirm(&self, question: &str) -> Result<bool, CtlError> {
        self.term.write_str(question).map_err(|e| CtlError::IoError {
            msg: "could not write the confirmation prompt".to_string(),
            nested: nested!(e),
        })?;

        let answer = self.term.read_line().map_err(|e| CtlError::IoError {
            msg: "could not read the confirmation answer".to_string(),
            nested: nested!(e),
        })?;
        debug!("Confirmation answer = [{}]", answer);

        Ok(is_affirmative(&answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("y\n"));
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative("Y"));
        assert!(!is_affirmative(""));
    }
}
