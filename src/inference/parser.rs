//! Normalizes the provider's response shape.
//!
//! Depending on model and mood the diagnosis arrives as a bare JSON
//! object, a ```json fenced block, or an object buried in surrounding
//! prose. This adapter yields exactly one `serde_json::Value` so
//! downstream code never branches on response shape.

use serde_json::Value;

use super::InferenceError;

/// Extract the diagnostic JSON object from raw model output.
pub fn parse_diagnosis_json(response: &str) -> Result<Value, InferenceError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    // Already-structured case: the whole response is the object.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Ok(value);
        }
    }

    // Fenced block case.
    if let Some(inner) = extract_fenced_block(trimmed) {
        return serde_json::from_str(&inner)
            .map_err(|e| InferenceError::JsonParsing(e.to_string()));
    }

    // Last resort: first '{' to last '}' of prose-wrapped output.
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return serde_json::from_str(&trimmed[start..=end])
                .map_err(|e| InferenceError::JsonParsing(e.to_string()));
        }
    }

    Err(InferenceError::MalformedResponse(
        "no JSON object in response".into(),
    ))
}

/// Extract the content of a ```json (or bare ```) fenced block.
fn extract_fenced_block(response: &str) -> Option<String> {
    let fence_start = response.find("```")?;
    let after_fence = &response[fence_start + 3..];
    // Skip an optional language tag up to the first newline.
    let content_start = after_fence.find('\n')? + 1;
    let content = &after_fence[content_start..];
    let fence_end = content.find("```")?;
    Some(content[..fence_end].trim().to_string())
}
