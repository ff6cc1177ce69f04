//! User-facing text shared by the TUI and the `check` command.

pub const TITLE: &str = "Fake News Detection (with Internet Search)";
pub const SUBTITLE: &str =
    "Paste any news below; the model checks whether it is Fake or Not using real-time search results.";
pub const EMPTY_CLAIM_WARNING: &str = "Please enter a news statement.";
pub const ANALYZING: &str = "Searching the web and analyzing...";
pub const SEARCH_CONTEXT_HEADING: &str = "Search Context:";
pub const SEARCH_FAILED: &str =
    "Failed to retrieve search results. Model is not internet-connected.";
pub const VERDICT_HEADING: &str = "Model Verdict";

/// Banner shown when search returned usable context.
pub fn connected_banner(provider: &str) -> String {
    format!("Model is connected to live internet search via {provider}")
}
