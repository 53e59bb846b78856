//! GitHub's wrappers & miscellaneous utilities. Everything ranging from a custom [`GitHubConnectionPoolManager`](client::pool::GitHubConnectionPoolManager)
//! to the concurrent [`PaginatedFetcher`](utils::pagination::PaginatedFetcher) is found in this module.

pub mod json;

pub mod client;

pub mod utils;
