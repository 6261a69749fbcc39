//! Error taxonomy for the roll pipeline.
//!
//! `Display` on [`RollError`] is the text shown to the chat user.

use thiserror::Error;

/// Why a compound expression was rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatIssue {
    /// More than one `#` in the expression token.
    TooManySeparators,
    /// More than two whitespace-separated tokens (expression and reason).
    TooManyTokens,
}

impl std::fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatIssue::TooManySeparators => write!(f, "more than one '#' separator"),
            FormatIssue::TooManyTokens => write!(f, "more than two whitespace tokens"),
        }
    }
}

/// Failure reported by a dice evaluator. The message is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Private-message delivery failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("暗骰结果发送失败：{message}")]
pub struct DeliveryError {
    pub message: String,
}

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    #[error("表达式错误")]
    Format { issue: FormatIssue },

    #[error("投掷次数必须是 1 到 {max} 之间的整数。")]
    Limit { max: u32 },

    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl RollError {
    /// Split into a reply for the originating channel or a delivery failure.
    ///
    /// Format, limit and evaluation errors are ordinary replies; only delivery
    /// failures propagate to the caller.
    pub fn into_reply(self) -> Result<String, DeliveryError> {
        match self {
            RollError::Delivery(err) => Err(err),
            other => Ok(other.to_string()),
        }
    }
}
