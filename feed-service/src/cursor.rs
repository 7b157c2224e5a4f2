/// Opaque pagination cursor
///
/// A cursor encodes the time boundary of the next page: base64 of the
/// RFC 3339 rendering of the last returned post's creation time. Callers
/// must treat it as opaque. An absent or empty cursor means "from now".
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{AppError, Result};

/// Encode a timestamp into an opaque cursor token.
///
/// Sub-second precision is preserved so that `decode(encode(t)) == t`.
pub fn encode(timestamp: DateTime<Utc>) -> String {
    let rendered = timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
    STANDARD.encode(rendered.as_bytes())
}

/// Decode a cursor token back into its time boundary.
///
/// `None` or an empty string decodes to the current time. Malformed base64
/// or an unparsable timestamp is a validation error, propagated to the
/// caller rather than swallowed.
pub fn decode(cursor: Option<&str>) -> Result<DateTime<Utc>> {
    let token = match cursor {
        None => return Ok(Utc::now()),
        Some(t) if t.is_empty() => return Ok(Utc::now()),
        Some(t) => t,
    };

    let bytes = STANDARD
        .decode(token)
        .map_err(|e| AppError::Validation(format!("cursor is not valid base64: {}", e)))?;
    let rendered = String::from_utf8(bytes)
        .map_err(|e| AppError::Validation(format!("cursor is not valid UTF-8: {}", e)))?;

    DateTime::parse_from_rfc3339(&rendered)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::Validation(format!("cursor is not a valid timestamp: {}", e)))
}
