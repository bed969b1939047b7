//! Cleanup of raw LLM text before JSON parsing.
//!
//! Models often wrap the requested JSON in a markdown fence, open with a
//! sentence of preamble, close with commentary, or write `+8` for a positive
//! number. `sanitize` removes those artifacts and returns the substring most
//! likely to parse. It does not guarantee validity; parsing is the
//! validator's job.

use regex_lite::Regex;
use std::sync::LazyLock;

// ": +8" / ":++8" -> ": 8"
static PLUS_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*\++(\d)").expect("valid regex"));

static OPENING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:json)?").expect("valid regex"));

static CLOSING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*$").expect("valid regex"));

/// Reduce `raw` to its structured-data core.
pub fn sanitize(raw: &str) -> String {
    let unwrapped = strip_delivery_artifacts(raw);
    repair_numbers(&unwrapped)
}

/// Steps 1-4: fences, format label, preamble, epilogue.
pub fn strip_delivery_artifacts(raw: &str) -> String {
    let mut output = raw.trim().to_string();

    if output.starts_with("```") {
        output = OPENING_FENCE_RE.replace(&output, "").into_owned();
        output = CLOSING_FENCE_RE.replace(&output, "").trim().to_string();
    }

    if output
        .get(..4)
        .is_some_and(|label| label.eq_ignore_ascii_case("json"))
    {
        output = output[4..].trim().to_string();
    }

    if let Some(start) = output.find(['{', '[']) {
        if start > 0 {
            output = output[start..].to_string();
        }
    }

    if let Some(end) = output.rfind(['}', ']']) {
        let trailing = output[end + 1..].trim();
        if !trailing.is_empty() && !trailing.starts_with([',', '}', ']']) {
            output.truncate(end + 1);
        }
    }

    output.trim().to_string()
}

/// Step 5: numbers written with one or more leading `+` signs.
pub fn repair_numbers(text: &str) -> String {
    PLUS_NUMBER_RE.replace_all(text, ": $1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_is_unchanged() {
        let clean = r#"{"story": "A fox watches you.", "hpChange": -3, "items": [1, 2]}"#;
        assert_eq!(sanitize(clean), clean);
    }

    #[test]
    fn fenced_json_with_preamble_is_unwrapped() {
        let core = r#"{"story": "Rain on the pines.", "expChange": 12}"#;
        let wrapped = format!("```JSON\nHere is your event:\n{core}\n```");
        assert_eq!(sanitize(&wrapped), core);
    }

    #[test]
    fn preamble_and_epilogue_are_removed() {
        let core = r#"{"story": "x"}"#;
        let raw = format!("Based on your request, I generated:\n{core}\nHope this helps!");
        assert_eq!(sanitize(&raw), core);
    }

    #[test]
    fn bare_json_label_is_removed() {
        assert_eq!(sanitize("json\n{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(sanitize("JSON {\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn plain_fence_without_label_is_removed() {
        assert_eq!(sanitize("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn plus_prefixed_numbers_are_repaired() {
        let raw = r#"{"spirit": +8, "attack":++12, "note": "a+b", "hp": -4}"#;
        let cleaned = sanitize(raw);
        assert!(cleaned.contains(r#""spirit": 8"#));
        assert!(cleaned.contains(r#""attack": 12"#));
        assert!(cleaned.contains(r#""note": "a+b""#));
        assert!(cleaned.contains(r#""hp": -4"#));
    }

    #[test]
    fn continuation_after_last_brace_is_kept() {
        let raw = "{\"a\": 1} , {\"b\": 2";
        assert_eq!(strip_delivery_artifacts(raw), raw);
    }

    #[test]
    fn text_without_structure_is_only_trimmed() {
        assert_eq!(sanitize("  no json here  "), "no json here");
    }
}
