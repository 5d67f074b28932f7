use serde::Serialize;
use uuid::Uuid;

use crate::error::WriterError;

/// Coarse category of a user-visible failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Network,
    Timeout,
    Generation,
}

impl NoticeKind {
    fn id_prefix(self) -> &'static str {
        match self {
            NoticeKind::Validation => "VAL",
            NoticeKind::Network => "NET",
            NoticeKind::Timeout => "TMO",
            NoticeKind::Generation => "GEN",
        }
    }
}

/// Error state shown to the user, with a retry affordance where it makes sense
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub suggestion: String,
    pub can_retry: bool,
    pub error_id: String,
}

impl ErrorNotice {
    fn new(kind: NoticeKind, title: &str, message: String, suggestion: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message,
            suggestion: suggestion.to_string(),
            can_retry: kind != NoticeKind::Validation,
            error_id: format!("{}_{}", kind.id_prefix(), Uuid::new_v4().simple()),
        }
    }

    pub fn validation() -> Self {
        Self::new(
            NoticeKind::Validation,
            "输入不完整",
            "请提供核心主题与其相关有效素材。".to_string(),
            "请填写两个输入项后再试。",
        )
    }

    pub fn network() -> Self {
        Self::new(
            NoticeKind::Network,
            "网络连接失败",
            "网络连接失败，请检查网络后重试".to_string(),
            "确认网络可用后点击重试。",
        )
    }

    pub fn timeout() -> Self {
        Self::new(
            NoticeKind::Timeout,
            "请求超时",
            "请求超时，请重试".to_string(),
            "稍等片刻后点击重试。",
        )
    }

    pub fn generation(message: &str) -> Self {
        let message = if message.trim().is_empty() {
            "生成失败，请重试".to_string()
        } else {
            message.to_string()
        };
        Self::new(NoticeKind::Generation, "生成失败", message, "请稍后重试。")
    }

    /// Classify an error for display.
    ///
    /// Returns `None` for cancellation, which is never surfaced.
    pub fn from_error(err: &WriterError) -> Option<Self> {
        let notice = match err {
            WriterError::Cancelled(_) => return None,
            WriterError::InvalidInput(_) => Self::validation(),
            WriterError::TransportError(e) if e.is_timeout() => Self::timeout(),
            WriterError::TransportError(e)
                if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() =>
            {
                Self::network()
            }
            WriterError::GenerationError(message) => Self::generation(message),
            other => Self::from_message(&other.to_string()),
        };
        Some(notice)
    }

    /// Classify by inspecting the error text
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if ["fetch", "network", "connect"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            Self::network()
        } else if lower.contains("timeout") || lower.contains("timed out") {
            Self::timeout()
        } else {
            Self::generation(message)
        }
    }
}

impl std::fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.title, self.message, self.suggestion)?;
        if self.can_retry {
            write!(f, " [可重试]")?;
        }
        write!(f, " ID: {}", self.error_id)
    }
}
