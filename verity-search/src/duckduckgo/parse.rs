use crate::text::element_text;
use crate::{SearchError, SearchHit};
use scraper::{Html, Selector};
use url::Url;

fn selector(css: &'static str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("selector {css}: {e}")))
}

/// Extract result blocks from a DuckDuckGo HTML results page.
///
/// A page with a results container but no organic results yields an empty
/// list. A page without the container at all (rate-limit or challenge pages)
/// is reported as [`SearchError::Parse`] so callers can tell "nothing found"
/// apart from "the search did not run".
pub fn parse_results(html: &str) -> Result<Vec<SearchHit>, SearchError> {
    let doc = Html::parse_document(html);
    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;
    let container_sel = selector("#links, .no-results, div.results")?;

    let mut hits = Vec::new();
    let mut saw_result = false;

    for block in doc.select(&result_sel) {
        saw_result = true;
        let classes = block.value().attr("class").unwrap_or_default();
        if classes.contains("result--ad") {
            continue;
        }

        let anchor = block.select(&title_sel).next();
        let href = anchor
            .and_then(|a| a.value().attr("href"))
            .and_then(unwrap_redirect);
        if href.as_deref().is_some_and(is_ad_link) {
            continue;
        }

        let title = anchor.map(element_text).filter(|t| !t.is_empty());
        let body = block
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty());

        hits.push(SearchHit { title, body, href });
    }

    if !saw_result && doc.select(&container_sel).next().is_none() {
        return Err(SearchError::Parse(
            "no result container in DuckDuckGo response (rate limited or challenged)".into(),
        ));
    }

    Ok(hits)
}

/// Resolve DuckDuckGo's `/l/?uddg=<target>` redirect links to their target.
///
/// Absolute links pass through unchanged; unparseable links yield `None`.
///
/// ```
/// use verity_search::duckduckgo::unwrap_redirect;
///
/// assert_eq!(
///     unwrap_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fnasa.gov%2Fmoon&rut=abc").as_deref(),
///     Some("https://nasa.gov/moon")
/// );
/// assert_eq!(
///     unwrap_redirect("https://example.com/a").as_deref(),
///     Some("https://example.com/a")
/// );
/// ```
pub fn unwrap_redirect(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    let is_ddg = url
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    if is_ddg && url.path().starts_with("/l/") {
        return url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }
    Some(url.to_string())
}

fn is_ad_link(href: &str) -> bool {
    Url::parse(href).is_ok_and(|u| {
        u.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) && u.path() == "/y.js"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div id="links" class="results">
  <div class="result results_links result--ad">
    <h2 class="result__title"><a class="result__a" href="https://duckduckgo.com/y.js?ad_provider=x">Buy cheese</a></h2>
    <a class="result__snippet">Sponsored</a>
  </div>
  <div class="result results_links results_links_deep web-result">
    <h2 class="result__title">
      <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fscience.nasa.gov%2Fmoon%2F&amp;rut=1">Moon  Facts - <b>NASA</b></a>
    </h2>
    <a class="result__snippet" href="x">The Moon is made of <b>rock</b>,
      not cheese.</a>
  </div>
  <div class="result results_links web-result">
    <h2 class="result__title"><a class="result__a" href="https://example.org/no-snippet">No snippet</a></h2>
  </div>
</div>
</body></html>"#;

    #[test]
    fn parses_organic_results_and_skips_ads() {
        let hits = parse_results(PAGE).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title.as_deref(), Some("Moon Facts - NASA"));
        assert_eq!(
            hits[0].body.as_deref(),
            Some("The Moon is made of rock, not cheese.")
        );
        assert_eq!(hits[0].href.as_deref(), Some("https://science.nasa.gov/moon/"));
        assert_eq!(hits[1].body, None);
    }

    #[test]
    fn no_results_page_is_empty_not_error() {
        let page = r#"<html><body><div id="links"><div class="no-results">No results.</div></div></body></html>"#;
        assert!(parse_results(page).unwrap().is_empty());
    }

    #[test]
    fn challenge_page_is_a_parse_error() {
        let page = "<html><body><form id=\"challenge-form\">Are you a robot?</form></body></html>";
        assert!(matches!(parse_results(page), Err(SearchError::Parse(_))));
    }

    #[test]
    fn relative_redirects_are_resolved() {
        assert_eq!(
            unwrap_redirect("/l/?uddg=https%3A%2F%2Fa.example%2F").as_deref(),
            Some("https://a.example/")
        );
        assert_eq!(unwrap_redirect("   "), None);
    }
}
