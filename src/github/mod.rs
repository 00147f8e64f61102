//! GitHub GraphQL implementation of [`SearchPort`](crate::port::SearchPort).
//!
//! [`GitHubClient`] posts search queries to the GraphQL endpoint with a bearer token. Counts use
//! `issueCount`; fetches page through the search connection 100 nodes at a time. All requests go
//! through a shared throttler that bounds concurrency and pauses every request while GitHub
//! reports an exhausted rate limit.

mod client;
mod graphql;

pub use client::GitHubClient;

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// GitHub search never returns more than this many results for one query.
pub const SEARCH_RESULT_CAP: u64 = 1000;

const LOG_TARGET: &str = "    github";
