use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use verity_core::prompt::SYSTEM_PROMPT;
use verity_core::{AnalysisError, AnalysisEvent, Analyzer, SearchOutcome};
use verity_http::HttpError;
use verity_llm::{ChatMessage, CompletionOpts, LlmClient, LlmError, LlmResponse};
use verity_search::{SearchError, SearchHit, SearchProvider};

#[derive(Default)]
struct FakeSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    calls: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl SearchProvider for FakeSearch {
    fn name(&self) -> &str {
        "FakeSearch"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.lock().unwrap().push((query.to_string(), max_results));
        if self.fail {
            return Err(SearchError::Http(HttpError::Network("connection refused".into())));
        }
        Ok(self.hits.clone())
    }
}

struct FakeLlm {
    reply: String,
    delay: Duration,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlm {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::replying("late")
        }
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _opts: CompletionOpts,
    ) -> Result<LlmResponse, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(LlmResponse {
            text: self.reply.clone(),
            model: None,
            tokens_used: None,
        })
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }

    fn provider_name(&self) -> &str {
        "FakeLlm"
    }
}

fn moon_hits() -> Vec<SearchHit> {
    vec![
        SearchHit::new("NASA", "The Moon is made of rock.", "https://nasa.gov/moon"),
        SearchHit::new("Wikipedia", "Lunar composition.", "https://en.wikipedia.org/wiki/Moon"),
        SearchHit::new("Snopes", "Cheese myth debunked.", "https://snopes.com/moon"),
        SearchHit::new("Extra", "Should be cut.", "https://extra.example"),
    ]
}

fn drain(mut rx: mpsc::Receiver<AnalysisEvent>) -> Vec<AnalysisEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

#[tokio::test]
async fn moon_cheese_end_to_end() {
    let search = Arc::new(FakeSearch {
        hits: moon_hits(),
        ..Default::default()
    });
    let verdict = "- Verdict: Fake\n- Confidence: High\n- Explanation: Rock.\n- Source Links (if used): https://nasa.gov/moon";
    let llm = Arc::new(FakeLlm::replying(verdict));
    let analyzer = Analyzer::new(search.clone(), llm.clone());
    let (tx, rx) = mpsc::channel(16);

    let report = analyzer
        .analyze("The moon is made of cheese", &tx, &CancellationToken::new())
        .await
        .expect("analysis succeeds");
    drop(tx);

    assert_eq!(
        *search.calls.lock().unwrap(),
        vec![("The moon is made of cheese".to_string(), 3)]
    );

    let expected_context = "NASA: The Moon is made of rock. (https://nasa.gov/moon)\n\n\
Wikipedia: Lunar composition. (https://en.wikipedia.org/wiki/Moon)\n\n\
Snopes: Cheese myth debunked. (https://snopes.com/moon)";
    match &report.search {
        SearchOutcome::Found { hits, context } => {
            assert_eq!(hits.len(), 3);
            assert_eq!(context, expected_context);
        }
        other => panic!("expected Found, got {other:?}"),
    }
    assert_eq!(report.verdict, verdict);
    assert_eq!(report.model, "fake-model");

    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0][0].content, SYSTEM_PROMPT);
    assert!(prompts[0][1].content.contains("Claim: The moon is made of cheese"));
    assert!(prompts[0][1].content.contains(expected_context));
    assert!(!prompts[0][1].content.contains("Should be cut."));

    let events = drain(rx);
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], AnalysisEvent::Started { .. }));
    assert!(matches!(&events[1], AnalysisEvent::Search { outcome, .. } if outcome.is_found()));
    assert!(matches!(&events[2], AnalysisEvent::Verdict { text, .. } if text == verdict));
    assert!(events.iter().all(|e| e.id() == report.id));
}

#[tokio::test]
async fn blank_claim_makes_no_calls() {
    let search = Arc::new(FakeSearch::default());
    let llm = Arc::new(FakeLlm::replying("unused"));
    let analyzer = Analyzer::new(search.clone(), llm.clone());
    let (tx, rx) = mpsc::channel(4);

    let err = analyzer
        .analyze("   \n", &tx, &CancellationToken::new())
        .await
        .expect_err("blank claim");
    drop(tx);

    assert!(matches!(err, AnalysisError::EmptyClaim));
    assert!(search.calls.lock().unwrap().is_empty());
    assert!(llm.prompts.lock().unwrap().is_empty());
    assert!(drain(rx).is_empty());
}

#[tokio::test]
async fn empty_search_still_asks_the_model() {
    let search = Arc::new(FakeSearch {
        hits: vec![SearchHit {
            title: None,
            body: Some("snippet without title".into()),
            href: None,
        }],
        ..Default::default()
    });
    let llm = Arc::new(FakeLlm::replying("- Verdict: Not Fake"));
    let analyzer = Analyzer::new(search, llm.clone());
    let (tx, _rx) = mpsc::channel(4);

    let report = analyzer
        .analyze("Water boils at 100C at sea level", &tx, &CancellationToken::new())
        .await
        .expect("analysis succeeds");

    assert_eq!(report.search, SearchOutcome::Empty);
    let prompts = llm.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0][1].content.contains("Search Results:\n\n\n"));
}

#[tokio::test]
async fn failed_search_is_reported_and_flow_continues() {
    let search = Arc::new(FakeSearch {
        fail: true,
        ..Default::default()
    });
    let llm = Arc::new(FakeLlm::replying("- Verdict: Fake"));
    let analyzer = Analyzer::new(search, llm.clone());
    let (tx, rx) = mpsc::channel(4);

    let report = analyzer
        .analyze("claim", &tx, &CancellationToken::new())
        .await
        .expect("analysis succeeds");
    drop(tx);

    assert!(matches!(&report.search, SearchOutcome::Failed { reason } if reason.contains("connection refused")));
    assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    assert_eq!(drain(rx).len(), 3);
}

#[tokio::test]
async fn configured_max_results_reaches_the_provider() {
    let search = Arc::new(FakeSearch {
        hits: moon_hits(),
        ..Default::default()
    });
    let analyzer = Analyzer::new(search.clone(), Arc::new(FakeLlm::replying("ok"))).with_max_results(2);
    let (tx, _rx) = mpsc::channel(4);

    let report = analyzer
        .analyze("claim", &tx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(search.calls.lock().unwrap()[0].1, 2);
    assert!(matches!(report.search, SearchOutcome::Found { ref hits, .. } if hits.len() == 2));
}

#[tokio::test]
async fn slow_completion_times_out() {
    let analyzer = Analyzer::new(
        Arc::new(FakeSearch::default()),
        Arc::new(FakeLlm::slow(Duration::from_secs(5))),
    )
    .with_timeout(Duration::from_millis(50));
    let (tx, _rx) = mpsc::channel(4);

    let err = analyzer
        .analyze("claim", &tx, &CancellationToken::new())
        .await
        .expect_err("times out");
    assert!(matches!(err, AnalysisError::TimedOut(d) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn cancellation_stops_a_running_analysis() {
    let analyzer = Analyzer::new(
        Arc::new(FakeSearch::default()),
        Arc::new(FakeLlm::slow(Duration::from_secs(5))),
    );
    let (tx, _rx) = mpsc::channel(4);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = analyzer
        .analyze("claim", &tx, &cancel)
        .await
        .expect_err("cancelled");
    assert!(matches!(err, AnalysisError::Cancelled));
}

#[tokio::test]
async fn claim_reaches_search_and_prompt_as_typed() {
    let raw = "  The moon is made of cheese\n";
    let search = Arc::new(FakeSearch {
        hits: moon_hits(),
        ..Default::default()
    });
    let llm = Arc::new(FakeLlm::replying("- Verdict: Fake"));
    let analyzer = Analyzer::new(search.clone(), llm.clone());
    let (tx, _rx) = mpsc::channel(16);

    let report = analyzer
        .analyze(raw, &tx, &CancellationToken::new())
        .await
        .expect("analysis succeeds");

    assert_eq!(report.claim.as_str(), raw);
    assert_eq!(search.calls.lock().unwrap()[0].0, raw);
    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0][1].content.starts_with(&format!("Claim: {raw}\n\nSearch Results:\n")));
}

#[test]
fn analysis_errors_map_onto_the_shared_error_type() {
    use verity_common::VerityError;

    assert!(matches!(
        VerityError::from(AnalysisError::EmptyClaim),
        VerityError::InvalidInput(_)
    ));
    assert!(matches!(
        VerityError::from(AnalysisError::TimedOut(Duration::from_secs(1))),
        VerityError::Timeout
    ));
    assert!(matches!(
        VerityError::from(AnalysisError::Cancelled),
        VerityError::Cancelled
    ));
    assert!(matches!(
        VerityError::from(AnalysisError::Completion(LlmError::EmptyResponse)),
        VerityError::Llm(_)
    ));
}
