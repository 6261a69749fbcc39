//! Evaluator contract and the repeat loop around it.

use dicer_types::{EvalError, EvaluatorConfig, ParsedExpression, RollOutcome};

/// Resolves one dice expression to a value and a rendered trace.
///
/// Implementations must be safe to call from concurrent requests; any
/// randomness source they hold is part of that contract.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str, config: &EvaluatorConfig)
    -> Result<RollOutcome, EvalError>;

    /// Whether a bare die marker of this notation family is worth evaluating.
    ///
    /// Messages starting with an unsupported family letter are left for other
    /// handlers instead of being answered with an error.
    fn supports_family(&self, _family: char) -> bool {
        true
    }
}

impl<F> Evaluator for F
where
    F: Fn(&str, &EvaluatorConfig) -> Result<RollOutcome, EvalError> + Send + Sync,
{
    fn evaluate(
        &self,
        expression: &str,
        config: &EvaluatorConfig,
    ) -> Result<RollOutcome, EvalError> {
        self(expression, config)
    }
}

/// Evaluate `parsed.repeat_count` times, strictly in order.
///
/// Stops at the first failure; completed rolls are discarded with it.
pub fn evaluate_all(
    evaluator: &dyn Evaluator,
    parsed: &ParsedExpression,
    config: &EvaluatorConfig,
) -> Result<Vec<RollOutcome>, EvalError> {
    let expression = parsed.dice_expression.as_str();
    (1..=parsed.repeat_count)
        .map(|round| {
            let result = evaluator.evaluate(expression, config);
            if let Err(err) = &result {
                tracing::debug!(round, expression, error = %err, "Evaluation failed");
            }
            result
        })
        .collect()
}
