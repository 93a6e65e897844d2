//! Transient status banners for create and vote outcomes.
//!
//! Only finished operations produce a notice; the caller shows its own
//! pending state while a request is in flight.

use serde::Serialize;

pub const SUCCESS_DISMISS_MS: u64 = 2000;
pub const ERROR_DISMISS_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub status: NoticeStatus,
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: NoticeStatus::Success,
            message: message.into(),
            dismiss_after_ms: SUCCESS_DISMISS_MS,
        }
    }

    /// Error banner for a failed `action` ("Submission", "Voting", ...).
    ///
    /// A wallet refusal gets a short fixed message instead of the raw error.
    pub fn failure(action: &str, error: &impl std::fmt::Display) -> Self {
        let text = error.to_string();
        let message = if text.contains("user rejected transaction") {
            "Transaction rejected by user".to_string()
        } else {
            format!("{action} failed: {text}")
        };
        Self {
            status: NoticeStatus::Error,
            message,
            dismiss_after_ms: ERROR_DISMISS_MS,
        }
    }
}
