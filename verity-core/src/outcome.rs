use serde::Serialize;
use uuid::Uuid;
use verity_search::SearchHit;

use crate::claim::Claim;

/// What the search step produced for one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SearchOutcome {
    /// At least one usable hit; `context` is what the model sees.
    Found { hits: Vec<SearchHit>, context: String },
    /// The provider answered but nothing could be rendered.
    Empty,
    /// The provider call itself failed.
    Failed { reason: String },
}

impl SearchOutcome {
    /// Text embedded in the prompt; empty unless [`SearchOutcome::Found`].
    pub fn context(&self) -> &str {
        match self {
            SearchOutcome::Found { context, .. } => context,
            _ => "",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// Progress of one analysis, emitted in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
    Started { id: Uuid, claim: Claim },
    Search { id: Uuid, outcome: SearchOutcome },
    Verdict { id: Uuid, text: String },
}

impl AnalysisEvent {
    pub fn id(&self) -> Uuid {
        match self {
            AnalysisEvent::Started { id, .. }
            | AnalysisEvent::Search { id, .. }
            | AnalysisEvent::Verdict { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub claim: Claim,
    pub search: SearchOutcome,
    /// Model output, verbatim.
    pub verdict: String,
    pub model: String,
}
