use crate::SearchHit;

/// Render one hit as `"{title}: {body} ({href})"`.
///
/// Returns `None` for malformed hits (blank title or body). A missing link
/// drops the trailing `(href)` part instead of rejecting the hit.
pub fn format_hit(hit: &SearchHit) -> Option<String> {
    let title = non_blank(hit.title.as_deref())?;
    let body = non_blank(hit.body.as_deref())?;
    Some(match non_blank(hit.href.as_deref()) {
        Some(href) => format!("{title}: {body} ({href})"),
        None => format!("{title}: {body}"),
    })
}

/// Join up to `max_results` well-formed hits, separated by a blank line.
///
/// An empty string means nothing usable came back.
///
/// ```
/// use verity_search::{format_context, SearchHit};
///
/// let hits = vec![
///     SearchHit::new("NASA", "The Moon is rock.", "https://nasa.gov"),
///     SearchHit::new("Wiki", "Not cheese.", "https://en.wikipedia.org"),
/// ];
/// assert_eq!(
///     format_context(&hits, 3),
///     "NASA: The Moon is rock. (https://nasa.gov)\n\nWiki: Not cheese. (https://en.wikipedia.org)"
/// );
/// ```
pub fn format_context(hits: &[SearchHit], max_results: usize) -> String {
    hits.iter()
        .filter_map(format_hit)
        .take(max_results)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
