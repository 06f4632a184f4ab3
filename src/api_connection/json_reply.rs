use serde::de::DeserializeOwned;

use super::connection::ApiConnectionError;

/// Returns the first balanced `{...}` span of `text` that parses as JSON.
///
/// Models wrap their answer in prose or markdown fences often enough that the
/// raw reply cannot be handed to serde directly.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(bytes, start) {
            let candidate = &text[start..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }
    None
}

// Index of the `}` closing the object opened at `start`, honouring string literals.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts the first JSON object in `text` and deserializes it into `T`.
/// Both a missing object and a shape mismatch are reported as
/// [`ApiConnectionError::InvalidContent`].
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, ApiConnectionError> {
    let json = extract_json_object(text).ok_or_else(|| {
        ApiConnectionError::InvalidContent("no JSON object found in response".to_string())
    })?;
    serde_json::from_str(json).map_err(|e| {
        ApiConnectionError::InvalidContent(format!("response did not match expected shape: {}", e))
    })
}
