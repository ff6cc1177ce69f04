//! DuckDuckGo HTML search.
//!
//! DuckDuckGo has no official results API; the `html.duckduckgo.com` endpoint
//! serves a script-free results page that we parse with `scraper`.

mod client;
mod parse;

pub use client::{DEFAULT_DUCKDUCKGO_ENDPOINT, DuckDuckGo};
pub use parse::{parse_results, unwrap_redirect};
