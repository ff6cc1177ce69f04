use super::types::{BRAVE_MAX_COUNT, SearchResult, WebSearchApiResponse};
use crate::text::html_to_text;
use crate::{SearchError, SearchHit, SearchProvider, format_hit};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use std::time::Instant;
use verity_http::{Auth, HttpClient, HttpError, RequestOpts};

pub const BRAVE_API_BASE: &str = "https://api.search.brave.com/";

/// Minimal client for the Brave Search API (web vertical).
#[derive(Clone)]
pub struct BraveSearch {
    http: HttpClient,
    token: String,
}

impl BraveSearch {
    pub fn new(http: HttpClient, subscription_token: String) -> Result<Self, SearchError> {
        if subscription_token.trim().is_empty() {
            return Err(SearchError::Config(
                "Brave search needs an API key (search.api_key or BRAVE_API_KEY)".into(),
            ));
        }
        Ok(Self {
            http,
            token: subscription_token,
        })
    }

    fn auth(&self) -> Result<Auth<'static>, SearchError> {
        let value = HeaderValue::from_str(self.token.trim())
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Auth::Header {
            name: HeaderName::from_static("x-subscription-token"),
            value,
        })
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    fn name(&self) -> &str {
        "Brave Search"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        // Headroom for records dropped as incomplete.
        let count = max_results.saturating_mul(2).clamp(1, BRAVE_MAX_COUNT);
        let started = Instant::now();
        tracing::info!(
            target: "search.brave",
            query_len = query.len(),
            count,
            "search.brave.start"
        );

        let resp: WebSearchApiResponse = self
            .http
            .get_json(
                "res/v1/web/search",
                RequestOpts {
                    auth: Some(self.auth()?),
                    query: Some(vec![("q", query.to_string()), ("count", count.to_string())]),
                    ..Default::default()
                },
            )
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    target: "search.brave",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "search.brave.error"
                );
            })?;

        let hits: Vec<SearchHit> = resp
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .map(to_hit)
            .filter(|h| format_hit(h).is_some())
            .take(max_results)
            .collect();

        tracing::info!(
            target: "search.brave",
            hit_count = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search.brave.success"
        );
        Ok(hits)
    }
}

fn to_hit(r: SearchResult) -> SearchHit {
    SearchHit {
        title: r.title.map(|t| html_to_text(&t)),
        body: r.description.map(|d| html_to_text(&d)),
        href: r.url,
    }
}
