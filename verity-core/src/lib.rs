//! Claim analysis: validate the claim, ground it with a web search, ask the
//! model for a verdict.
//!
//! [`Analyzer`] owns the flow and reports progress as [`AnalysisEvent`]s so the
//! terminal UI and the one-shot CLI render the same sequence.
pub mod analyzer;
pub mod claim;
pub mod messages;
pub mod outcome;
pub mod prompt;

pub use analyzer::{AnalysisError, Analyzer, DEFAULT_ANALYSIS_TIMEOUT};
pub use claim::Claim;
pub use outcome::{AnalysisEvent, AnalysisReport, SearchOutcome};
