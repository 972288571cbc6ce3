//! Reply text extraction across the response shapes the endpoint has used.

use serde_json::Value;

/// Pull the reply text out of a successful response body.
///
/// Tries, in order: `candidates[0].output.content`, `candidates[0].content`
/// as a string, `candidates[0].content.parts[*].text`, top-level
/// `output.text`, top-level `text`. Falls back to the raw JSON so the
/// result is never empty.
pub fn extract_reply_text(json: &Value) -> String {
    let first = json["candidates"].as_array().and_then(|c| c.first());

    let from_candidate = first.and_then(|candidate| {
        non_empty(&candidate["output"]["content"])
            .or_else(|| non_empty(&candidate["content"]))
            .or_else(|| joined_parts(&candidate["content"]["parts"]))
    });

    from_candidate
        .or_else(|| non_empty(&json["output"]["text"]))
        .or_else(|| non_empty(&json["text"]))
        .unwrap_or_else(|| json.to_string())
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn joined_parts(parts: &Value) -> Option<String> {
    let text: String = parts
        .as_array()?
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    (!text.is_empty()).then_some(text)
}
