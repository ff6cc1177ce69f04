use std::io::Write;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use verity_common::{Result, VerityError};
use verity_core::{AnalysisReport, Analyzer};
use verity_tui::Transcript;

/// Process exit code for a finished `check`: 0 on a verdict, 2 when the
/// claim was rejected, 1 for anything else.
pub fn exit_code(outcome: &Result<AnalysisReport>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(VerityError::InvalidInput(_)) => 2,
        Err(_) => 1,
    }
}

/// Analyze one claim, writing each step to `out` as soon as it happens.
///
/// A failed analysis is printed the same way the terminal UI shows it and
/// then returned as a [`VerityError`].
pub async fn run_check<W: Write>(
    analyzer: &Analyzer,
    claim: &str,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<AnalysisReport> {
    let provider = analyzer.search_provider().to_string();
    let (tx, mut rx) = mpsc::channel(8);

    let analysis = async {
        let tx = tx;
        analyzer.analyze(claim, &tx, cancel).await
    };
    let mut transcript = Transcript::default();
    let mut printed = 0;
    let printer = async {
        while let Some(ev) = rx.recv().await {
            transcript.event(&ev, &provider);
            flush(&transcript, &mut printed, out)?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (result, printed_ok) = tokio::join!(analysis, printer);
    printed_ok?;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            transcript.failure(&e);
            flush(&transcript, &mut printed, out)?;
            out.flush()?;
            return Err(e.into());
        }
    };
    out.flush()?;
    Ok(report)
}

fn flush<W: Write>(transcript: &Transcript, printed: &mut usize, out: &mut W) -> std::io::Result<()> {
    for line in &transcript.lines()[*printed..] {
        writeln!(out, "{}", line.text)?;
    }
    *printed = transcript.len();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiring::build_analyzer;
    use verity_config::{LlmProviderKind, VeritySettings};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DDG_PAGE: &str = r##"<html><body><div id="links" class="results">
<div class="result results_links web-result"><h2 class="result__title">
<a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fnasa.gov%2Fmoon&amp;rut=x">NASA Moon facts</a></h2>
<a class="result__snippet" href="#">The Moon is made of rock.</a></div>
</div></body></html>"##;

    fn settings_for(ddg: &MockServer, llm: &MockServer) -> VeritySettings {
        let mut cfg = VeritySettings::default();
        cfg.search.endpoint = Some(ddg.uri());
        cfg.llm.provider = LlmProviderKind::Ollama;
        cfg.llm.model = Some("llama3.2:3b".into());
        cfg.llm.endpoint = Some(llm.uri());
        cfg
    }

    #[tokio::test]
    async fn prints_context_before_verdict() {
        let ddg = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .and(body_string_contains("q=The+moon+is+made+of+cheese"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DDG_PAGE))
            .expect(1)
            .mount(&ddg)
            .await;

        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains("The Moon is made of rock."))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2:3b",
                "message": {"role": "assistant", "content": "- Verdict: Fake\n- Confidence: High"},
                "done": true
            })))
            .expect(1)
            .mount(&llm)
            .await;

        let analyzer = build_analyzer(&settings_for(&ddg, &llm)).expect("wiring");
        let mut out = Vec::new();
        let outcome = run_check(
            &analyzer,
            "The moon is made of cheese",
            &CancellationToken::new(),
            &mut out,
        )
        .await;

        assert_eq!(exit_code(&outcome), 0);
        let text = String::from_utf8(out).unwrap();
        let banner = text
            .find("Model is connected to live internet search via DuckDuckGo")
            .expect("banner");
        let context = text
            .find("NASA Moon facts: The Moon is made of rock. (https://nasa.gov/moon)")
            .expect("context");
        let verdict = text.find("- Verdict: Fake").expect("verdict");
        assert!(banner < context && context < verdict);
    }

    #[tokio::test]
    async fn empty_claim_exits_with_two_and_no_requests() {
        let ddg = MockServer::start().await;
        let llm = MockServer::start().await;
        let analyzer = build_analyzer(&settings_for(&ddg, &llm)).expect("wiring");

        let mut out = Vec::new();
        let outcome = run_check(&analyzer, "  ", &CancellationToken::new(), &mut out).await;

        assert!(matches!(outcome, Err(VerityError::InvalidInput(_))));
        assert_eq!(exit_code(&outcome), 2);
        assert!(String::from_utf8(out).unwrap().contains("Please enter a news statement."));
        assert!(ddg.received_requests().await.unwrap_or_default().is_empty());
        assert!(llm.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn completion_failure_exits_with_one() {
        let ddg = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DDG_PAGE))
            .mount(&ddg)
            .await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&llm)
            .await;

        let analyzer = build_analyzer(&settings_for(&ddg, &llm)).expect("wiring");
        let mut out = Vec::new();
        let outcome = run_check(&analyzer, "claim", &CancellationToken::new(), &mut out).await;

        assert!(matches!(outcome, Err(VerityError::Http(_))));
        assert_eq!(exit_code(&outcome), 1);
        assert!(String::from_utf8(out).unwrap().contains("× Error:"));
    }

    #[tokio::test]
    async fn no_search_results_still_reaches_the_model() {
        let ddg = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><div id="links" class="results"><div class="no-results">No results.</div></div></body></html>"#,
            ))
            .expect(1)
            .mount(&ddg)
            .await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains(r"Search Results:\n\n\nPlease analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2:3b",
                "message": {"role": "assistant", "content": "- Verdict: Fake"},
                "done": true
            })))
            .expect(1)
            .mount(&llm)
            .await;

        let analyzer = build_analyzer(&settings_for(&ddg, &llm)).expect("wiring");
        let mut out = Vec::new();
        let outcome = run_check(&analyzer, "Obscure claim", &CancellationToken::new(), &mut out).await;

        assert_eq!(exit_code(&outcome), 0);
        let text = String::from_utf8(out).unwrap();
        let warning = text
            .find("× Failed to retrieve search results. Model is not internet-connected.")
            .expect("search warning");
        assert!(!text.contains("Search Context:"));
        assert!(!text.contains("connected to live internet search"));
        let verdict = text.find("- Verdict: Fake").expect("verdict");
        assert!(warning < verdict);
    }

    #[tokio::test]
    async fn verdict_is_printed_verbatim() {
        let reply = "- Verdict: Fake\n\n  - Explanation: the Moon is rock\n- Source Links: https://nasa.gov/moon\n";
        let ddg = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DDG_PAGE))
            .mount(&ddg)
            .await;
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.2:3b",
                "message": {"role": "assistant", "content": reply},
                "done": true
            })))
            .mount(&llm)
            .await;

        let analyzer = build_analyzer(&settings_for(&ddg, &llm)).expect("wiring");
        let mut out = Vec::new();
        let report = run_check(&analyzer, "The moon is made of cheese", &CancellationToken::new(), &mut out)
            .await
            .expect("verdict");

        assert_eq!(report.verdict, reply);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("← [Model Verdict]\n{reply}")));
    }
}
