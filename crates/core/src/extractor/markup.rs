//! Raw-markup offer extraction.
//!
//! When a backend only yields an unstructured results page, the cleaned
//! content is sent to an LLM with a strict JSON-array-only instruction. The
//! model is a black box that may return garbage; anything that does not
//! parse as the expected array is logged and treated as zero offers.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::warn;

use crate::config::ExtractorConfig;
use crate::normalizer::RawOffer;

use super::llm::{CompletionRequest, LlmClient};

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<style[^>]*>.*?</style>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const SYSTEM_PROMPT: &str =
    "You extract structured data from HTML. Return only valid JSON arrays.";

/// Strip scripts and styles, collapse whitespace, truncate to the bound.
pub fn clean_markup(html: &str, max_chars: usize) -> String {
    let cleaned = SCRIPT_RE.replace_all(html, "");
    let cleaned = STYLE_RE.replace_all(&cleaned, "");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    cleaned.chars().take(max_chars).collect()
}

fn build_extraction_prompt(cleaned: &str) -> String {
    format!(
        r#"Extract all flight options from this flight search results HTML page.

For each flight, return a JSON object with these fields:
- price: string (e.g. "$507")
- duration: string (total travel time, e.g. "6 hr 25 min")
- stops: string ("Nonstop", "1 stop", etc., or "Unknown")
- airline: string (operating carrier name)
- departure_time: string (HH:MM format, e.g. "08:30")
- arrival_time: string (HH:MM format, e.g. "14:45")

Return ONLY a JSON array of flight objects. No other text. If there are no
flights or the page shows an error, return an empty array [].

HTML content:
{}"#,
        cleaned
    )
}

/// Strip a markdown code fence if the model wrapped its answer in one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

/// Parse the model's answer into offers; malformed output yields an empty Vec.
pub fn parse_extraction(text: &str) -> Vec<RawOffer> {
    let payload = strip_code_fence(text);
    match serde_json::from_str::<Vec<RawOffer>>(payload) {
        Ok(offers) => offers,
        Err(e) => {
            warn!(error = %e, "Extraction output was not a valid offer array");
            Vec::new()
        }
    }
}

/// Extract offers from a raw results page via the LLM.
///
/// Never fails: LLM errors and malformed output both collapse to an empty
/// offer list so the pipeline keeps moving.
pub async fn extract_offers(
    client: &dyn LlmClient,
    html: &str,
    config: &ExtractorConfig,
) -> Vec<RawOffer> {
    let cleaned = clean_markup(html, config.max_content_chars);
    let request =
        CompletionRequest::new(build_extraction_prompt(&cleaned)).with_system(SYSTEM_PROMPT);

    match client.complete(request).await {
        Ok(text) => parse_extraction(&text),
        Err(e) => {
            warn!(provider = client.provider(), error = %e, "LLM extraction failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_markup_strips_scripts_and_styles() {
        let html = "<html><script>var x = 1;</script><style>.a { color: red }</style>\
                    <body>JetBlue   $507\n  4 hr 30 min</body></html>";
        let cleaned = clean_markup(html, 100_000);
        assert!(!cleaned.contains("var x"));
        assert!(!cleaned.contains("color"));
        assert!(cleaned.contains("JetBlue $507 4 hr 30 min"));
    }

    #[test]
    fn clean_markup_truncates() {
        let html = "a".repeat(500);
        assert_eq!(clean_markup(&html, 100).len(), 100);
    }

    #[test]
    fn parse_extraction_accepts_plain_array() {
        let offers = parse_extraction(
            r#"[{"price":"$507","duration":"4 hr 30 min","stops":"Nonstop","airline":"JetBlue","departure_time":"08:30","arrival_time":"13:00"}]"#,
        );
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, "$507");
    }

    #[test]
    fn parse_extraction_strips_code_fences() {
        let offers = parse_extraction("```json\n[{\"price\":\"$300\"}]\n```");
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, "$300");
    }

    #[test]
    fn parse_extraction_malformed_is_empty() {
        assert!(parse_extraction("I could not find any flights.").is_empty());
        assert!(parse_extraction("{\"flights\": []}").is_empty());
        assert!(parse_extraction("").is_empty());
    }
}
