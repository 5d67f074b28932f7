use serde::{Deserialize, Serialize};

use crate::error::{Result, WriterError};

/// Body of the POST sent to the generation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerateRequest {
    /// Core topic of the note
    pub keyword: String,

    /// Reference material: tone, details, selling points or a rough draft
    pub user_info: String,
}

impl GenerateRequest {
    /// Build a request from raw user input, trimming both fields.
    ///
    /// Both fields are required; an empty (or whitespace-only) field is an
    /// input validation error.
    pub fn new(keyword: impl AsRef<str>, user_info: impl AsRef<str>) -> Result<Self> {
        let request = Self {
            keyword: keyword.as_ref().trim().to_string(),
            user_info: user_info.as_ref().trim().to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        match (self.keyword.trim().is_empty(), self.user_info.trim().is_empty()) {
            (false, false) => Ok(()),
            (true, true) => Err(WriterError::InvalidInput(
                "keyword and user_info are required".to_string(),
            )),
            (true, false) => Err(WriterError::InvalidInput("keyword is required".to_string())),
            (false, true) => Err(WriterError::InvalidInput(
                "user_info is required".to_string(),
            )),
        }
    }
}
