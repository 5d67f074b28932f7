//! Pre-rendered documents handed over in one piece instead of streamed.
//!
//! The document is percent-encoded (UTF-8) and then base64-encoded so it can
//! travel in a query parameter.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{Result, WriterError};

/// Decode a base64-then-percent-encoded document
pub fn decode_document(encoded: &str) -> Result<String> {
    if encoded.trim().is_empty() {
        return Err(WriterError::InvalidDocument("document is empty".to_string()));
    }

    // Query-string decoding turns `+` into a space, so spaces are restored
    // rather than trimmed; only line breaks and tabs are dropped
    let cleaned: String = encoded
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| WriterError::InvalidDocument(format!("invalid base64: {}", e)))?;

    let escaped = String::from_utf8(bytes)
        .map_err(|e| WriterError::InvalidDocument(format!("not percent-encoded text: {}", e)))?;

    let decoded = urlencoding::decode(&escaped)
        .map_err(|e| WriterError::InvalidDocument(format!("invalid percent-encoding: {}", e)))?;

    Ok(decoded.into_owned())
}

/// Inverse of [`decode_document`]
pub fn encode_document(text: &str) -> String {
    STANDARD.encode(urlencoding::encode(text).as_bytes())
}
