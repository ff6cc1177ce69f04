use super::parse::parse_results;
use crate::{SearchError, SearchHit, SearchProvider, format_hit};
use async_trait::async_trait;
use std::time::Instant;
use verity_http::{HttpClient, RequestOpts};

pub const DEFAULT_DUCKDUCKGO_ENDPOINT: &str = "https://html.duckduckgo.com/";

/// Keyless DuckDuckGo search over the HTML endpoint.
#[derive(Clone)]
pub struct DuckDuckGo {
    http: HttpClient,
}

impl DuckDuckGo {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Client against the public endpoint with default HTTP settings.
    pub fn public() -> Result<Self, SearchError> {
        Ok(Self::new(HttpClient::new(DEFAULT_DUCKDUCKGO_ENDPOINT)?))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGo {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let started = Instant::now();
        tracing::info!(
            target: "search.duckduckgo",
            query_len = query.len(),
            max_results,
            "search.duckduckgo.start"
        );

        let form = [("q", query.to_string()), ("b", String::new())];
        let page = match self
            .http
            .post_form_text("html/", &form, RequestOpts::default())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    target: "search.duckduckgo",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "search.duckduckgo.error"
                );
                return Err(e.into());
            }
        };

        let hits: Vec<SearchHit> = parse_results(&page)?
            .into_iter()
            .filter(|h| format_hit(h).is_some())
            .take(max_results)
            .collect();

        tracing::info!(
            target: "search.duckduckgo",
            hit_count = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search.duckduckgo.success"
        );
        Ok(hits)
    }
}
