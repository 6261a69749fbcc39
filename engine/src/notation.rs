//! Default [`Evaluator`] backed by the `tyche` dice library.
//!
//! Grammar belongs to `tyche`; this binding fills in the configured defaults
//! for bare `d` terms, enforces the roll-count guard, and rolls dice through
//! an injected [`RandomPort`] when one is given.
//!
//! Only the standard `d` family exists in `tyche`, so bare `p`, `a`, `c` and
//! `f` markers are reported as unsupported and left to other handlers.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tyche::Expr;
use tyche::dice::DieRoll;
use tyche::dice::roller::{FastRand, Roller};

use dicer_types::{DiceDefaults, EvalError, EvaluatorConfig, RollOutcome};

use crate::evaluator::Evaluator;

/// Source of die faces.
///
/// Production code leaves this unset and uses `tyche`'s fast roller; tests
/// inject a fixed sequence for deterministic output.
pub trait RandomPort: Send + Sync {
    /// A value in `min..=max`.
    fn random_range(&self, min: i32, max: i32) -> i32;
}

/// Adapts a [`RandomPort`] to `tyche`'s roller interface for one evaluation.
struct PortRoller<'a> {
    port: &'a dyn RandomPort,
}

impl Roller for PortRoller<'_> {
    fn roll_die(&mut self, sides: u8) -> DieRoll {
        let max = i32::from(sides.max(1));
        let face = self.port.random_range(1, max).clamp(1, max);
        DieRoll::new(u8::try_from(face).unwrap_or(sides))
    }
}

#[derive(Clone, Default)]
pub struct TycheEvaluator {
    random: Option<Arc<dyn RandomPort>>,
}

impl TycheEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll every die through `random` instead of the built-in roller.
    #[must_use]
    pub fn with_random(random: Arc<dyn RandomPort>) -> Self {
        Self {
            random: Some(random),
        }
    }
}

impl fmt::Debug for TycheEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TycheEvaluator")
            .field("injected_random", &self.random.is_some())
            .finish()
    }
}

impl Evaluator for TycheEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        config: &EvaluatorConfig,
    ) -> Result<RollOutcome, EvalError> {
        let expanded = expand_dice_defaults(expression, config.d);
        check_roll_count(&expanded, config.max_roll_count)?;

        let expr: Expr = expanded
            .parse()
            .map_err(|e| EvalError::new(format!("无法解析表达式 {expression}：{e}")))?;
        let evaled = match &self.random {
            Some(port) => expr.eval(&mut PortRoller {
                port: port.as_ref(),
            }),
            None => expr.eval(&mut FastRand::default()),
        }
        .map_err(|e| EvalError::new(format!("投掷失败：{e}")))?;
        let value = evaled
            .calc()
            .map_err(|e| EvalError::new(format!("计算失败：{e}")))?;

        Ok(RollOutcome::new(i64::from(value), evaled.to_string()))
    }

    fn supports_family(&self, family: char) -> bool {
        family == 'd'
    }
}

/// Give bare `d` terms the configured count and faces: `d` → `1d100`,
/// `3d` → `3d100`, `4dkh2` → `4d100kh2`.
fn expand_dice_defaults(expression: &str, defaults: DiceDefaults) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 8);

    for (i, &ch) in chars.iter().enumerate() {
        if ch != 'd' {
            out.push(ch);
            continue;
        }
        let prev = i.checked_sub(1).map(|j| chars[j]);
        let next = chars.get(i + 1).copied();
        if !prev.is_some_and(|c| c.is_ascii_digit() || c == ')') {
            out.push_str(&defaults.count.to_string());
        }
        out.push('d');
        if !next.is_some_and(|c| c.is_ascii_digit() || c == '(') {
            out.push_str(&defaults.faces.to_string());
        }
    }

    out
}

fn dice_term() -> &'static Regex {
    static DICE_TERM: OnceLock<Regex> = OnceLock::new();
    DICE_TERM.get_or_init(|| Regex::new(r"(\d+)d\d").expect("valid dice term regex"))
}

/// Reject expressions whose explicit die counts add up past `max_roll_count`.
fn check_roll_count(expression: &str, max_roll_count: u32) -> Result<(), EvalError> {
    let total = dice_term()
        .captures_iter(expression)
        .map(|caps| caps[1].parse::<u64>().unwrap_or(u64::MAX))
        .fold(0u64, u64::saturating_add);
    if total > u64::from(max_roll_count) {
        return Err(EvalError::new(format!(
            "单次投掷数量不能超过 {max_roll_count} 个。"
        )));
    }
    Ok(())
}
