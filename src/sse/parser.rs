//! Frame decoding
//!
//! Turns one complete, delimiter-stripped frame into its event name and
//! JSON payload.

use crate::sse::events::{DecodedFrame, SseLine};

const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";

/// Parse a single frame line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(rest) = line.strip_prefix(EVENT_PREFIX) {
        return SseLine::Event(rest.to_string());
    }

    if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
        return SseLine::Data(rest.to_string());
    }

    SseLine::Other
}

/// Decode a complete frame.
///
/// The last event name wins, and the last data line that parses as JSON
/// wins. A data line with invalid JSON is logged and contributes nothing.
/// Returns `None` when the frame has no (non-empty) event name or no
/// usable payload; such frames are dropped without touching state. An
/// empty object or array is still a payload.
pub fn decode_frame(raw: &str) -> Option<DecodedFrame> {
    let mut event: Option<String> = None;
    let mut payload: Option<serde_json::Value> = None;

    for line in raw.split('\n') {
        match parse_sse_line(line) {
            SseLine::Event(name) => event = Some(name),
            SseLine::Data(data) => match serde_json::from_str::<serde_json::Value>(&data) {
                Ok(value) => payload = Some(value),
                Err(e) => {
                    tracing::warn!("Discarding malformed data line: {}", e);
                }
            },
            SseLine::Other => {}
        }
    }

    let event = event.filter(|name| !name.is_empty())?;
    let payload = payload.filter(|value| !is_blank_payload(value))?;

    Some(DecodedFrame { event, payload })
}

/// `null`, `false`, zero and `""` carry nothing and count as no payload.
fn is_blank_payload(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => false,
    }
}
