use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use verity_common::VerityError;
use verity_llm::{CompletionOpts, LlmClient, LlmError};
use verity_search::{format_context, format_hit, SearchProvider, DEFAULT_MAX_RESULTS};

use crate::claim::Claim;
use crate::outcome::{AnalysisEvent, AnalysisReport, SearchOutcome};
use crate::prompt;

pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("claim is empty")]
    EmptyClaim,

    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),

    #[error("analysis timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("analysis cancelled")]
    Cancelled,
}

impl From<AnalysisError> for VerityError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::TimedOut(_) => VerityError::Timeout,
            AnalysisError::Cancelled => VerityError::Cancelled,
            AnalysisError::Completion(e) => e.into(),
            AnalysisError::EmptyClaim => VerityError::InvalidInput("claim is empty".into()),
        }
    }
}

/// Runs one search followed by one completion per claim.
///
/// Clients are injected once and shared; an `Analyzer` is cheap to clone.
#[derive(Clone)]
pub struct Analyzer {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmClient>,
    max_results: usize,
    timeout: Duration,
    opts: CompletionOpts,
}

impl Analyzer {
    pub fn new(search: Arc<dyn SearchProvider>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            search,
            llm,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
            opts: CompletionOpts::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_completion_opts(mut self, opts: CompletionOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn search_provider(&self) -> &str {
        self.search.name()
    }

    pub fn llm_provider(&self) -> &str {
        self.llm.provider_name()
    }

    pub fn model(&self) -> &str {
        self.llm.model_name()
    }

    /// Analyze `raw` and stream progress into `events`.
    ///
    /// A blank claim fails with [`AnalysisError::EmptyClaim`] before any
    /// event is emitted or any provider is called. Events that cannot be
    /// delivered (receiver gone) are dropped; the returned report is complete
    /// either way.
    pub async fn analyze(
        &self,
        raw: &str,
        events: &mpsc::Sender<AnalysisEvent>,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let claim = Claim::parse(raw)?;
        let id = Uuid::new_v4();
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.run(id, claim, events)) => {
                res.unwrap_or(Err(AnalysisError::TimedOut(self.timeout)))
            }
        };

        match &result {
            Ok(_) => tracing::info!(
                %id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "analysis.done"
            ),
            Err(e) => tracing::warn!(%id, error = %e, "analysis.failed"),
        }
        result
    }

    async fn run(
        &self,
        id: Uuid,
        claim: Claim,
        events: &mpsc::Sender<AnalysisEvent>,
    ) -> Result<AnalysisReport, AnalysisError> {
        tracing::info!(%id, chars = claim.as_str().chars().count(), "analysis.start");
        emit(
            events,
            AnalysisEvent::Started {
                id,
                claim: claim.clone(),
            },
        )
        .await;

        let outcome = self.search(&claim).await;
        emit(
            events,
            AnalysisEvent::Search {
                id,
                outcome: outcome.clone(),
            },
        )
        .await;

        let messages = prompt::build_messages(&claim, outcome.context());
        let response = self.llm.complete(&messages, self.opts).await?;
        tracing::info!(
            %id,
            model = self.llm.model_name(),
            tokens = ?response.tokens_used,
            "analysis.verdict"
        );
        emit(
            events,
            AnalysisEvent::Verdict {
                id,
                text: response.text.clone(),
            },
        )
        .await;

        Ok(AnalysisReport {
            id,
            claim,
            search: outcome,
            verdict: response.text,
            model: response
                .model
                .unwrap_or_else(|| self.llm.model_name().to_string()),
        })
    }

    async fn search(&self, claim: &Claim) -> SearchOutcome {
        match self.search.search(claim.as_str(), self.max_results).await {
            Ok(hits) => {
                let hits: Vec<_> = hits
                    .into_iter()
                    .filter(|h| format_hit(h).is_some())
                    .take(self.max_results)
                    .collect();
                let context = format_context(&hits, self.max_results);
                tracing::info!(
                    provider = self.search.name(),
                    hits = hits.len(),
                    "analysis.search"
                );
                if context.is_empty() {
                    SearchOutcome::Empty
                } else {
                    SearchOutcome::Found { hits, context }
                }
            }
            Err(e) => {
                tracing::warn!(provider = self.search.name(), error = %e, "analysis.search_failed");
                SearchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

async fn emit(events: &mpsc::Sender<AnalysisEvent>, event: AnalysisEvent) {
    if events.send(event).await.is_err() {
        tracing::debug!("analysis.event_dropped");
    }
}
