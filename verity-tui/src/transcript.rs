use std::sync::LazyLock;

use ratatui::style::Style;
use regex::Regex;
use verity_core::{AnalysisError, AnalysisEvent, SearchOutcome, messages};

use crate::styles;

/// Matches the labelled lines of the verdict format, tolerating list markers
/// and markdown emphasis (`- **Verdict:** Fake`).
static VERDICT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*•]\s*)?\**\s*(verdict|confidence|explanation|source links)\b[^:]*:\**\s*(.*)$",
    )
    .expect("static regex")
});

#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptLine {
    pub text: String,
    pub style: Style,
}

impl TranscriptLine {
    pub fn new(text: String, style: Style) -> Self {
        Self { text, style }
    }
}

/// Scrollback of every analysis in this session.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn push_styled<S: Into<String>>(&mut self, s: S, style: Style) {
        self.lines.push(TranscriptLine::new(s.into(), style));
    }

    pub fn push_blank(&mut self) {
        self.push_styled(String::new(), Style::default());
    }

    /// Append the lines for one analysis event.
    pub fn event(&mut self, ev: &AnalysisEvent, search_provider: &str) {
        match ev {
            AnalysisEvent::Started { claim, .. } => {
                self.push_styled("→ [Claim]", styles::claim_header());
                for line in claim.as_str().lines() {
                    self.push_styled(format!("  {line}"), styles::claim_text());
                }
                self.push_styled(messages::ANALYZING, styles::system());
                self.push_blank();
            }
            AnalysisEvent::Search { outcome, .. } => self.search(outcome, search_provider),
            AnalysisEvent::Verdict { text, .. } => self.verdict(text),
        }
    }

    fn search(&mut self, outcome: &SearchOutcome, provider: &str) {
        match outcome {
            SearchOutcome::Found { context, .. } => {
                self.push_styled(
                    format!("✓ {}", messages::connected_banner(provider)),
                    styles::success(),
                );
                self.push_styled(messages::SEARCH_CONTEXT_HEADING, styles::label());
                for line in context.lines() {
                    self.push_styled(format!("  {line}"), styles::value());
                }
            }
            SearchOutcome::Empty => {
                self.push_styled(format!("× {}", messages::SEARCH_FAILED), styles::warning());
            }
            SearchOutcome::Failed { reason } => {
                self.push_styled(format!("× {}", messages::SEARCH_FAILED), styles::warning());
                self.push_styled(format!("  ({reason})"), styles::dim());
            }
        }
        self.push_blank();
    }

    /// The model's text is shown as returned: no indent, no trimming, blank
    /// lines kept, so joining the lines with `\n` gives back the reply.
    fn verdict(&mut self, text: &str) {
        self.push_styled(format!("← [{}]", messages::VERDICT_HEADING), styles::verdict_header());
        for line in text.split('\n') {
            self.push_styled(line, verdict_line_style(line));
        }
        self.push_blank();
    }

    /// Terminal state for an analysis that did not produce a verdict.
    pub fn failure(&mut self, err: &AnalysisError) {
        match err {
            AnalysisError::EmptyClaim => {
                self.push_styled(messages::EMPTY_CLAIM_WARNING, styles::warning());
            }
            AnalysisError::Cancelled => {
                self.push_styled("× Analysis cancelled.", styles::warning());
            }
            other => {
                self.push_styled(format!("× Error: {other}"), styles::error());
            }
        }
        self.push_blank();
    }
}

/// Highlight labelled verdict lines; the verdict itself is coloured by value.
pub fn verdict_line_style(line: &str) -> Style {
    let Some(caps) = VERDICT_LABEL.captures(line) else {
        return styles::verdict_text();
    };
    let label = caps[1].to_ascii_lowercase();
    if label != "verdict" {
        return styles::label();
    }
    let value = caps[2]
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .to_ascii_lowercase();
    if value.starts_with("not fake") {
        styles::not_fake()
    } else if value.starts_with("fake") {
        styles::fake()
    } else {
        styles::label()
    }
}
