//! End-to-end roll pipeline behavior with scripted evaluators.

use std::sync::Arc;

use dicer_engine::{
    DEFAULT_EXPRESSION, RollLimits, RollRequest, RollService, Settings, TycheEvaluator,
};

use crate::common::{CaptureDelivery, FixedRandom, SpyEvaluator, alice, service};

#[tokio::test]
async fn repeat_count_over_limit_never_reaches_evaluator() {
    let spy = SpyEvaluator::values(&[4]);
    let service = service(Arc::clone(&spy));

    let reply = service
        .execute(
            RollRequest::new("11#d6", false),
            &alice(),
            &CaptureDelivery::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "投掷次数必须是 1 到 10 之间的整数。");
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn repeated_rolls_are_listed_in_order() {
    let spy = SpyEvaluator::values(&[4, 2, 6]);
    let service = service(Arc::clone(&spy));

    let reply = service
        .execute(
            RollRequest::new("3#d6", false),
            &alice(),
            &CaptureDelivery::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "Alice 投掷:\n3#d6 = 4, 2, 6");
    assert_eq!(spy.calls(), 3);
    assert_eq!(spy.expressions(), vec!["d6", "d6", "d6"]);
}

#[tokio::test]
async fn evaluation_error_is_the_whole_reply() {
    let spy = SpyEvaluator::failing("无法解析表达式 zz");
    let service = service(Arc::clone(&spy));

    let reply = service
        .execute(RollRequest::new("zz", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, "无法解析表达式 zz");
}

#[tokio::test]
async fn failure_mid_sequence_stops_further_rolls() {
    let spy = SpyEvaluator::new(vec![
        Ok(dicer_engine::RollOutcome::new(3, "3")),
        Err(dicer_engine::EvalError::new("boom")),
        Ok(dicer_engine::RollOutcome::new(5, "5")),
    ]);
    let service = service(Arc::clone(&spy));

    let reply = service
        .execute(
            RollRequest::new("5#d6", false),
            &alice(),
            &CaptureDelivery::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "boom");
    assert_eq!(spy.calls(), 2);
}

#[tokio::test]
async fn empty_payload_rolls_default_expression() {
    let spy = SpyEvaluator::with_trace(42, "42");
    let service = service(Arc::clone(&spy));

    let reply = service
        .execute(RollRequest::new("", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(spy.expressions(), vec![DEFAULT_EXPRESSION]);
    assert_eq!(reply, "Alice 投掷:\nd = 42 = 42");
}

#[tokio::test]
async fn trace_exactly_at_budget_is_kept() {
    let settings = Settings {
        limits: RollLimits::new(10, 8).unwrap(),
        ..Settings::default()
    };
    let spy = SpyEvaluator::with_trace(9, "(4+5)+00");
    let service = RollService::new(settings, spy);

    let reply = service
        .execute(RollRequest::new("2d6", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, "Alice 投掷:\n2d6 = (4+5)+00 = 9");
}

#[tokio::test]
async fn trace_past_budget_is_dropped() {
    let settings = Settings {
        limits: RollLimits::new(10, 7).unwrap(),
        ..Settings::default()
    };
    let spy = SpyEvaluator::with_trace(9, "(4+5)+00");
    let service = RollService::new(settings, spy);

    let reply = service
        .execute(RollRequest::new("2d6", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, "Alice 投掷:\n2d6 = 9");
}

#[tokio::test]
async fn reason_appears_in_attribution() {
    let spy = SpyEvaluator::with_trace(15, "15");
    let service = service(spy);

    let reply = service
        .execute(
            RollRequest::new("d20 侦查", false),
            &alice(),
            &CaptureDelivery::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "Alice 因为 侦查 投掷:\nd20 = 15 = 15");
}

#[tokio::test]
async fn format_errors_do_not_evaluate() {
    let spy = SpyEvaluator::values(&[1]);
    let service = service(Arc::clone(&spy));
    let delivery = CaptureDelivery::new();

    let too_many_tokens = service
        .execute(RollRequest::new("d6 a b", false), &alice(), &delivery)
        .await
        .unwrap();
    let too_many_separators = service
        .execute(RollRequest::new("2#3#d6", false), &alice(), &delivery)
        .await
        .unwrap();

    assert_eq!(too_many_tokens, "表达式错误");
    assert_eq!(too_many_separators, "表达式错误");
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn default_evaluator_rolls_real_dice() {
    let service = RollService::with_default_evaluator(Settings::default());

    let reply = service
        .execute(RollRequest::new("1+2", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert!(reply.starts_with("Alice 投掷:\n1+2 = "), "{reply}");
    assert!(reply.ends_with("= 3"), "{reply}");
}

#[tokio::test]
async fn default_evaluator_guards_roll_count() {
    let service = RollService::with_default_evaluator(Settings::default());

    let reply = service
        .execute(
            RollRequest::new("101d6", false),
            &alice(),
            &CaptureDelivery::new(),
        )
        .await
        .unwrap();

    assert_eq!(reply, "单次投掷数量不能超过 100 个。");
}

#[tokio::test]
async fn reply_echoes_expression_as_written() {
    let spy = SpyEvaluator::with_trace(8, "8");
    let service = service(Arc::clone(&spy));

    let reply = service
        .execute(RollRequest::new("2D6", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, "Alice 投掷:\n2D6 = 8 = 8");
    assert_eq!(spy.expressions(), vec!["2d6"]);
}

#[tokio::test]
async fn injected_random_gives_exact_reply() {
    let evaluator = TycheEvaluator::with_random(Arc::new(FixedRandom(5)));
    let service = RollService::new(Settings::default(), Arc::new(evaluator));

    let reply = service
        .execute(RollRequest::new("2d6", false), &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, "Alice 投掷:\n2d6 = 2d6[5, 5] = 10");
}
