//! Everything needed to talk to GitHub: the managed client pool, token lookup, the [`gateway`] the commands
//! go through, and the translation of upstream failures.

pub mod connector;
pub mod gateway;
pub mod pool;
pub mod token;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_server;
