use scraper::{Html, Selector};
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));

/// Text of the first `<title>` element, as written in the page.
pub fn extract_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let title = document
        .select(&TITLE)
        .next()?
        .text()
        .collect::<String>();
    if title.is_empty() { None } else { Some(title) }
}
