//! URL utilities for video ids, query strings and redirect targets

use crate::error::ParserError;
use std::collections::HashMap;
use url::Url;

/// Check that `id` looks like a video id: 6 to 12 characters of `[A-Za-z0-9_-]`
pub fn is_video_id(id: &str) -> bool {
    (6..=12).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Extract video ID from a raw id or from a watch, short or share URL
pub fn extract_video_id(input: &str) -> Result<String, ParserError> {
    let input = input.trim();
    if is_video_id(input) {
        return Ok(input.to_string());
    }

    let parsed = Url::parse(input)?;
    let id = match parsed.host_str() {
        Some("youtu.be") => parsed.path().trim_start_matches('/').to_string(),
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com") => {
            if parsed.path().starts_with("/watch") {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.to_string())
                    .ok_or_else(|| ParserError::InvalidUrl("Missing v parameter".to_string()))?
            } else if let Some(rest) = parsed.path().strip_prefix("/shorts/") {
                rest.to_string()
            } else {
                return Err(ParserError::InvalidUrl(
                    "Unsupported video URL format".to_string(),
                ));
            }
        }
        _ => {
            return Err(ParserError::InvalidUrl(
                "Not a supported video platform URL".to_string(),
            ))
        }
    };

    if is_video_id(&id) {
        Ok(id)
    } else {
        Err(ParserError::InvalidVideoId(id))
    }
}

/// Decode a form-encoded query string; `+` decodes to a space
pub fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Resolve a redirect `Location` against the URL that produced it
pub fn resolve_location(current: &str, location: &str) -> Result<String, ParserError> {
    let base = Url::parse(current)?;
    Ok(base.join(location)?.to_string())
}
