//! JSON wrappers for the GitHub model objects `ghctl` reads and writes.
//!
//! Only the fields the commands actually use are mapped; everything else in GitHub's payloads is ignored.

pub mod invitation;
pub mod rate_limit;
pub mod release;
pub mod repository;
pub mod pull_request;
pub mod user;
