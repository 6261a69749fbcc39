//! Chat messages routed through recognition into the pipeline.

use std::sync::Arc;

use dicer_engine::{InboundMessage, RollService, Settings};

use crate::common::{CaptureDelivery, SpyEvaluator, alice, service};

#[tokio::test]
async fn unaddressed_text_is_left_alone() {
    let spy = SpyEvaluator::values(&[1]);
    let service = service(Arc::clone(&spy));

    let reply = service
        .handle_chat("r d20", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, None);
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn prefixed_plain_roll_is_answered() {
    let spy = SpyEvaluator::with_trace(12, "12");
    let service = service(Arc::clone(&spy));

    let reply = service
        .handle_chat(".r d20 攻击", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("Alice 因为 攻击 投掷:\nd20 = 12 = 12"));
    assert_eq!(spy.expressions(), vec!["d20"]);
}

#[tokio::test]
async fn full_width_prefix_is_accepted() {
    let spy = SpyEvaluator::with_trace(3, "3");
    let service = service(spy);

    let reply = service
        .handle_chat("。r", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("Alice 投掷:\nd = 3 = 3"));
}

#[tokio::test]
async fn mention_counts_as_addressed() {
    let spy = SpyEvaluator::with_trace(5, "5");
    let service = service(Arc::clone(&spy));

    let reply = service
        .handle_chat("@dicer 2d6", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("Alice 投掷:\n2d6 = 5 = 5"));
}

#[tokio::test]
async fn mention_of_someone_else_is_ignored() {
    let spy = SpyEvaluator::values(&[1]);
    let service = service(Arc::clone(&spy));

    let reply = service
        .handle_chat("@dicerbot 2d6", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, None);
}

#[tokio::test]
async fn prefixed_chatter_is_not_a_roll() {
    let spy = SpyEvaluator::values(&[1]);
    let service = service(Arc::clone(&spy));

    let reply = service
        .handle_chat(".help", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply, None);
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn repeat_shorthand_keeps_whole_payload() {
    let spy = SpyEvaluator::values(&[2, 4]);
    let service = service(spy);
    let message = InboundMessage::new("2#d4", None, true);

    let reply = service
        .handle_message(&message, &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("Alice 投掷:\n2#d4 = 2, 4"));
}

#[tokio::test]
async fn configured_prefixes_replace_defaults() {
    let settings = Settings {
        prefixes: vec!["!".to_string()],
        ..Settings::default()
    };
    let spy = SpyEvaluator::with_trace(6, "6");
    let service = RollService::new(settings, spy.clone());

    let ignored = service
        .handle_chat(".r d6", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();
    let answered = service
        .handle_chat("!r d6", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(ignored, None);
    assert_eq!(answered.as_deref(), Some("Alice 投掷:\nd6 = 6 = 6"));
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn conversation_with_the_bot_is_not_a_roll() {
    let service = RollService::with_default_evaluator(Settings::default());

    for text in ["@dicer a question", "@dicer f", "@dicer p2"] {
        let reply = service
            .handle_chat(text, &alice(), &CaptureDelivery::new())
            .await
            .unwrap();
        assert_eq!(reply, None, "{text}");
    }
}

#[tokio::test]
async fn upper_case_notation_is_recognized() {
    let spy = SpyEvaluator::values(&[11, 7]);
    let service = service(Arc::clone(&spy));

    let plain = service
        .handle_chat(".rD20", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();
    let bare = service
        .handle_chat(".2D6", &alice(), &CaptureDelivery::new())
        .await
        .unwrap();

    assert_eq!(plain.as_deref(), Some("Alice 投掷:\nD20 = 11 = 11"));
    assert_eq!(bare.as_deref(), Some("Alice 投掷:\n2D6 = 7 = 7"));
    assert_eq!(spy.expressions(), vec!["d20", "2d6"]);
}
