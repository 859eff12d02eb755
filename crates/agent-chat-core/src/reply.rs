//! Defensive reply-text extraction over loosely-shaped agent responses.

use serde_json::Value;

/// Named fields probed for the reply text, in priority order.
const REPLY_FIELDS: [&str; 3] = ["response", "text", "content"];

/// Extract the reply text from an agent response payload.
///
/// The response shape is not guaranteed stable, so extraction is a
/// fixed probe order over string fields (`response`, `text`, `content`),
/// then a bare string payload, then the pretty-printed serialization of
/// the whole payload. Never fails on a well-formed payload.
#[must_use]
pub fn extract_reply_text(payload: &Value) -> String {
    if let Value::Object(map) = payload {
        for field in REPLY_FIELDS {
            if let Some(Value::String(text)) = map.get(field) {
                return text.clone();
            }
        }
    }

    if let Value::String(text) = payload {
        return text.clone();
    }

    serde_json::to_string_pretty(payload).unwrap_or_default()
}
