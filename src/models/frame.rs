use serde::Deserialize;

/// Payload that marks the clean end of a generation stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// One reassembled `data:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Trimmed text following the `data:` prefix
    Payload(String),
    /// The `[DONE]` sentinel
    Done,
}

impl StreamFrame {
    pub fn from_payload(payload: &str) -> Self {
        if payload == DONE_SENTINEL {
            StreamFrame::Done
        } else {
            StreamFrame::Payload(payload.to_string())
        }
    }
}

/// JSON object carried by a non-sentinel frame
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FramePayload {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// What a single payload means for the accumulated buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameAction {
    /// Non-empty delta to append
    Append(String),
    /// Backend reported a generation failure
    Fail(String),
    /// Well-formed but carries nothing actionable
    Ignore,
    /// Not a JSON object; the parse error message
    Malformed(String),
}

impl FrameAction {
    /// Decode a payload string.
    ///
    /// Content wins over error when both are present and content is non-empty.
    pub fn decode(payload: &str) -> Self {
        let parsed: FramePayload = match serde_json::from_str(payload) {
            Ok(parsed) => parsed,
            Err(e) => return FrameAction::Malformed(e.to_string()),
        };

        match parsed {
            FramePayload {
                content: Some(content),
                ..
            } if !content.is_empty() => FrameAction::Append(content),
            FramePayload {
                error: Some(error), ..
            } if is_truthy(&error) => FrameAction::Fail(match error {
                serde_json::Value::String(message) => message,
                other => other.to_string(),
            }),
            _ => FrameAction::Ignore,
        }
    }
}

/// Null, `false`, zero and the empty string do not signal a failure
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
