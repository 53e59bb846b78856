//! Everything `ghctl` shows (or asks) on the terminal besides command results.

pub mod prompt;
pub mod spin;
