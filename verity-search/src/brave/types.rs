use serde::{Deserialize, Serialize};

/// Largest page size the web endpoint accepts.
pub const BRAVE_MAX_COUNT: usize = 20;

/// Subset of the Brave web search response that we consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSearchApiResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub query: Option<Query>,

    #[serde(default)]
    pub web: Option<Search>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub altered: Option<String>,
}

/// The "web" vertical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single web result. Brave omits fields freely, hence the options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// HTML snippet; matches are wrapped in `<strong>`.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
}
