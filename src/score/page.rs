use super::ScorePayload;
use crate::error::FetchError;
use scraper::{Html, Selector};
use serde_json::Value;

/// Position of the payload script on the pages seen so far; tried before the rest
const PAYLOAD_SCRIPT_INDEX: usize = 8;

/// What the fetcher needs from a score page
#[derive(Debug)]
pub struct ScorePage {
    pub payload: ScorePayload,
    /// `href` of the first `<link>` element, if there is one
    pub first_link: Option<String>,
}

/// Extract the score payload and the first link href from a page.
///
/// Every `<script>` is a candidate; the first whose text is a JSON object
/// carrying string `name` and `thumbnailUrl` fields wins.
pub fn parse_score_page(html: &str) -> Result<ScorePage, FetchError> {
    let document = Html::parse_document(html);

    let scripts: Vec<String> = document
        .select(&selector("script")?)
        .map(|el| el.text().collect())
        .collect();

    let payload = find_payload(&scripts).ok_or(FetchError::PayloadNotFound)?;

    let first_link = document
        .select(&selector("link")?)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string);

    Ok(ScorePage {
        payload,
        first_link,
    })
}

fn selector(css: &'static str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Selector {
        css,
        reason: e.to_string(),
    })
}

fn find_payload(scripts: &[String]) -> Option<ScorePayload> {
    let preferred = scripts.get(PAYLOAD_SCRIPT_INDEX);
    let rest = scripts
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != PAYLOAD_SCRIPT_INDEX)
        .map(|(_, text)| text);

    preferred
        .into_iter()
        .chain(rest)
        .map(String::as_str)
        .find_map(parse_payload)
}

fn parse_payload(text: &str) -> Option<ScorePayload> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}
