//! Web search adapters used to ground a claim before it reaches the model.
//!
//! - [`SearchProvider`]: one query in, an ordered list of [`SearchHit`]s out
//! - [`duckduckgo`]: keyless HTML endpoint, the default provider
//! - [`brave`]: Brave Search API client (needs a subscription token)
//! - [`format_context`]: flattens hits into the text block embedded in the prompt
//!
//! Providers do not rank or deduplicate; hits keep the order the service
//! returned them in. Records missing a title, snippet or link are dropped
//! before the result cap is applied.

pub mod brave;
mod context;
pub mod duckduckgo;
mod text;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use verity_common::VerityError;
use verity_http::HttpError;

pub use context::{format_context, format_hit};

/// Number of results requested when the caller does not say otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// One search result as returned by a provider.
///
/// Every field is optional: providers are not trusted to return complete
/// records, and [`format_context`] skips the ones it cannot render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub href: Option<String>,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            href: Some(href.into()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] HttpError),

    #[error("unexpected search response: {0}")]
    Parse(String),

    #[error("search provider misconfigured: {0}")]
    Config(String),
}

impl From<SearchError> for VerityError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Http(e) => VerityError::Http(e.to_string()),
            SearchError::Config(msg) => VerityError::Config(msg),
            other @ SearchError::Parse(_) => VerityError::Search(other.to_string()),
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human readable provider name, shown in the UI banner.
    fn name(&self) -> &str;

    /// Run one query and return at most `max_results` complete hits in
    /// provider order.
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SearchHit>, SearchError>;
}
