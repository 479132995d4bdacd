//! Response sanitation.
//!
//! Generation responses are supposed to be bare JSON, but models wrap them
//! in code fences, prepend prose, and sprinkle markup into string fields.
//! Sanitation is unconditional: trim, strip fences, parse, then strip
//! markup from every string in the document before a handler looks at it.

use serde_json::Value;

use super::AiError;
use crate::util::strip_html;

/// Remove surrounding Markdown code-fence markers (``` and ```json).
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The fence line may carry a language tag; drop through end of line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return trimmed,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Trim, strip fences, and parse the response as JSON.
pub fn parse_json_response(response: &str) -> Result<Value, AiError> {
    let body = strip_code_fences(response);
    if body.is_empty() {
        return Err(AiError::MalformedResponse("empty response".to_string()));
    }
    serde_json::from_str(body).map_err(|e| AiError::MalformedResponse(e.to_string()))
}

/// Strip markup from every string field, recursively.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(strip_html(&text)),
        Value::Array(elements) => {
            Value::Array(elements.into_iter().map(sanitize_value).collect())
        }
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| (key, sanitize_value(field)))
                .collect(),
        ),
        other => other,
    }
}
