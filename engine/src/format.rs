//! Reply rendering.
//!
//! Single rolls show `expr = trace = value` unless the trace is longer than
//! the details budget; repeated rolls only list the values.

use dicer_types::{ParsedExpression, RollLimits, RollOutcome, char_len};

/// `"{name} 投掷:\n"` or `"{name} 因为 {reason} 投掷:\n"`.
#[must_use]
pub fn attribution(display_name: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{display_name} 因为 {reason} 投掷:\n"),
        None => format!("{display_name} 投掷:\n"),
    }
}

/// Public acknowledgment left in the channel for a hidden roll.
#[must_use]
pub fn hidden_stub(display_name: &str) -> String {
    format!("{display_name} 投掷了暗骰。")
}

/// Render evaluated outcomes into one message body with its attribution line.
#[must_use]
pub fn render_outcomes(
    parsed: &ParsedExpression,
    outcomes: &[RollOutcome],
    display_name: &str,
    limits: &RollLimits,
) -> String {
    let mut text = attribution(display_name, parsed.reason.as_deref());
    let expression = parsed.display_expression();

    match outcomes {
        [single] if parsed.repeat_count == 1 => {
            let trace = single.trace.render();
            if char_len(trace) > limits.max_details_size() {
                text.push_str(&format!("{expression} = {}", single.value));
            } else {
                text.push_str(&format!("{expression} = {trace} = {}", single.value));
            }
        }
        _ => {
            let values: Vec<String> = outcomes.iter().map(|o| o.value.to_string()).collect();
            text.push_str(&format!("{expression} = {}", values.join(", ")));
        }
    }

    text
}
