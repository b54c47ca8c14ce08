//! Recovery of the JSON object embedded in a free-text model reply.

use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// First `{` through the last `}`, across newlines.
fn object_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static pattern is valid"))
}

/// Return the `{...}` span of `reply` verbatim, after checking it parses as
/// JSON.
///
/// The reply is trimmed first. The span is greedy: with two objects in the
/// reply it covers both plus the prose between them, and validation fails.
///
/// ```
/// use extractpdfrecord::reply::extract_json_object;
///
/// let reply = "Sure! ```json\n{\"A\":\"1\"}\n```";
/// assert_eq!(extract_json_object(reply).unwrap(), "{\"A\":\"1\"}");
/// ```
pub fn extract_json_object(reply: &str) -> Result<&str> {
    let reply = reply.trim();

    let Some(found) = object_span().find(reply) else {
        tracing::error!(raw = %reply, "model did not return valid JSON");
        return Err(Error::NoJsonFound {
            raw: reply.to_string(),
        });
    };

    let span = found.as_str();
    if let Err(e) = serde_json::from_str::<serde_json::Value>(span) {
        tracing::error!(raw = %reply, error = %e, "received invalid JSON response from the model");
        return Err(Error::MalformedJson {
            raw: reply.to_string(),
            message: e.to_string(),
        });
    }

    Ok(span)
}
