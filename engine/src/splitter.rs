//! Splits `[times#]expression[ reason]` into a [`ParsedExpression`].

use dicer_types::{
    DEFAULT_EXPRESSION, FormatIssue, NonEmptyString, ParsedExpression, RollError, RollLimits,
    unescape_markup,
};

use crate::limits::check_repeat_count;

const MAX_TOKENS: usize = 2;
const REPEAT_SEPARATOR: char = '#';

/// Parse a roll payload.
///
/// Format problems (too many tokens, more than one `#`) are reported before
/// the repeat count is looked at, so `"2d6#3#x"` is a format error even
/// though `2d6` is not a number.
pub fn split_expression(payload: &str, limits: &RollLimits) -> Result<ParsedExpression, RollError> {
    let tokens: Vec<&str> = payload.split_whitespace().collect();
    if tokens.len() > MAX_TOKENS {
        return Err(RollError::Format {
            issue: FormatIssue::TooManyTokens,
        });
    }

    let expression = unescape_markup(tokens.first().copied().unwrap_or(DEFAULT_EXPRESSION));
    let reason = tokens.get(1).map(|reason| (*reason).to_string());

    if expression.matches(REPEAT_SEPARATOR).count() > 1 {
        return Err(RollError::Format {
            issue: FormatIssue::TooManySeparators,
        });
    }

    let (repeat_count, dice) = match expression.split_once(REPEAT_SEPARATOR) {
        Some((times, dice)) => (check_repeat_count(parse_number(times), limits)?, dice),
        None => (1, &*expression),
    };

    Ok(ParsedExpression::new(
        repeat_count,
        NonEmptyString::or_default(dice, DEFAULT_EXPRESSION),
        reason,
    ))
}

/// Unparseable text becomes NaN so the limit check reports it.
fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}
