use scraper::{ElementRef, Html};

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<String>())
}

/// Strip inline markup (Brave wraps matches in `<strong>`) and decode entities.
pub(crate) fn html_to_text(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    collapse_ws(&doc.root_element().text().collect::<String>())
}

pub(crate) fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
