//! Folio Stats
//!
//! Read-through caches in front of the GitHub and LeetCode GraphQL APIs.
//! Each [`StatCache`] holds at most one snapshot for the life of the
//! process; the first [`StatCache::ensure`] on a cold cache fetches it and
//! concurrent callers share that fetch.

use std::future::Future;

use serde::Serialize;

pub mod cache;
pub mod error;
pub mod github;
pub mod leetcode;
pub mod view;

pub use cache::StatCache;
pub use error::{Result, StatsError};
pub use github::{ContributionDay, GithubSnapshot, GithubSource};
pub use leetcode::{LeetcodeSnapshot, LeetcodeSource};
pub use view::{GithubModel, LeetcodeModel, View};

/// An external statistics API.
pub trait StatSource: Send + Sync + 'static {
    /// Parsed payload of one successful fetch.
    type Snapshot: Serialize + Send + Sync + 'static;

    /// Short name used in logs.
    const NAME: &'static str;

    /// Perform one outbound request.
    fn fetch(&self) -> impl Future<Output = Result<Self::Snapshot>> + Send;
}

/// Build the HTTP client shared by the sources.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .build()
        .map_err(|e| StatsError::Request(e.to_string()))
}
