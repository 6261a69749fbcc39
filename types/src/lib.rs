//! Core domain types for dicer.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the roll pipeline.

mod context;
mod error;
mod text;

pub use context::{NameSource, RequestContext, default_name_order};
pub use error::{DeliveryError, EvalError, FormatIssue, RollError};
pub use text::{char_len, unescape_markup};

use serde::Deserialize;
use thiserror::Error;

/// Canonical single-die expression used when the user supplies none.
pub const DEFAULT_EXPRESSION: &str = "d";

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("dice expression must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    /// Build from `value`, substituting `fallback` when `value` is blank.
    #[must_use]
    pub fn or_default(value: impl Into<String>, fallback: &'static str) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self(fallback.to_string())
        } else {
            Self(value)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Roll Pipeline Types
// ============================================================================

/// A chat message recognized as a roll invocation, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    /// Unparsed `[times#]expression[ reason]` payload. May be empty.
    pub raw_text: String,
    /// Deliver the result privately and leave a public stub.
    pub hidden: bool,
}

impl RollRequest {
    pub fn new(raw_text: impl Into<String>, hidden: bool) -> Self {
        Self {
            raw_text: raw_text.into(),
            hidden,
        }
    }
}

/// Output of the expression splitter.
///
/// A `ParsedExpression` always carries a repeat count inside the configured
/// ceiling and a non-empty dice expression. The evaluator sees the
/// lower-cased form; replies echo the expression as the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExpression {
    pub repeat_count: u32,
    /// Lower-cased expression handed to the evaluator.
    pub dice_expression: NonEmptyString,
    /// Expression as written, after markup unescaping.
    pub written_expression: NonEmptyString,
    pub reason: Option<String>,
}

impl ParsedExpression {
    pub fn new(repeat_count: u32, written: NonEmptyString, reason: Option<String>) -> Self {
        Self {
            repeat_count,
            dice_expression: NonEmptyString(written.as_str().to_lowercase()),
            written_expression: written,
            reason,
        }
    }

    /// Expression as echoed back to the user, `times#expr` when repeated.
    #[must_use]
    pub fn display_expression(&self) -> String {
        if self.repeat_count > 1 {
            format!("{}#{}", self.repeat_count, self.written_expression)
        } else {
            self.written_expression.to_string()
        }
    }
}

/// Rendered breakdown of how an evaluator arrived at a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNode(String);

impl TraceNode {
    pub fn new(rendered: impl Into<String>) -> Self {
        Self(rendered.into())
    }

    #[must_use]
    pub fn render(&self) -> &str {
        &self.0
    }
}

/// One evaluator result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub value: i64,
    pub trace: TraceNode,
}

impl RollOutcome {
    pub fn new(value: i64, trace: impl Into<String>) -> Self {
        Self {
            value,
            trace: TraceNode::new(trace),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Public,
    /// Send privately to the invoking user, then post a public stub.
    PrivateThenStub,
}

/// Final text handed to the dispatch gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    pub delivery_mode: DeliveryMode,
}

// ============================================================================
// Limits & Evaluator Parameters
// ============================================================================

/// Validated roll limits.
///
/// `max_roll_times >= 1` is guaranteed by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollLimits {
    max_roll_times: u32,
    max_details_size: usize,
}

#[derive(Debug, Clone, Error)]
pub enum RollLimitsError {
    #[error("max_roll_times must be at least 1")]
    ZeroRollTimes,
}

impl RollLimits {
    pub const DEFAULT_MAX_ROLL_TIMES: u32 = 10;
    pub const DEFAULT_MAX_DETAILS_SIZE: usize = 500;

    pub fn new(max_roll_times: u32, max_details_size: usize) -> Result<Self, RollLimitsError> {
        if max_roll_times == 0 {
            return Err(RollLimitsError::ZeroRollTimes);
        }
        Ok(Self {
            max_roll_times,
            max_details_size,
        })
    }

    #[must_use]
    pub const fn max_roll_times(&self) -> u32 {
        self.max_roll_times
    }

    /// Longest trace, in characters, still shown in a single-roll reply.
    #[must_use]
    pub const fn max_details_size(&self) -> usize {
        self.max_details_size
    }
}

impl Default for RollLimits {
    fn default() -> Self {
        Self {
            max_roll_times: Self::DEFAULT_MAX_ROLL_TIMES,
            max_details_size: Self::DEFAULT_MAX_DETAILS_SIZE,
        }
    }
}

/// Parameter bundle passed by reference into every evaluator call.
///
/// ```toml
/// [evaluator]
/// max_roll_count = 100
/// [evaluator.d]
/// count = 1
/// faces = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Most dice a single evaluation may roll.
    pub max_roll_count: u32,
    /// Defaults for the plain `d` notation family.
    pub d: DiceDefaults,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_roll_count: 100,
            d: DiceDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiceDefaults {
    pub count: u32,
    pub faces: u32,
}

impl Default for DiceDefaults {
    fn default() -> Self {
        Self {
            count: 1,
            faces: 100,
        }
    }
}
