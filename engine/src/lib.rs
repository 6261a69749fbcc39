//! Roll pipeline for Dicer.
//!
//! Recognizes roll invocations in chat text, splits and validates the
//! expression, evaluates it through an [`Evaluator`], renders the reply and
//! routes hidden rolls through a private channel.

use std::sync::Arc;

pub use dicer_config::{ConfigError, DicerConfig, Settings};
pub use dicer_types::{
    DEFAULT_EXPRESSION, DeliveryError, DeliveryMode, EvalError, EvaluatorConfig, FormatIssue,
    NameSource, ParsedExpression, RenderedMessage, RequestContext, RollError, RollLimits,
    RollOutcome, RollRequest, TraceNode,
};

mod dispatch;
mod evaluator;
mod format;
mod limits;
mod notation;
mod recognizer;
mod splitter;

pub use dispatch::{ChatDelivery, DeliveryFut, dispatch};
pub use evaluator::{Evaluator, evaluate_all};
pub use format::{attribution, hidden_stub, render_outcomes};
pub use limits::check_repeat_count;
pub use notation::{RandomPort, TycheEvaluator};
pub use recognizer::{
    HIDDEN_FLAGS, InboundMessage, Shorthand, classify, command_request, match_prefix, recognize,
};
pub use splitter::split_expression;

/// Runs roll requests end to end against shared settings and one evaluator.
///
/// Cheap to clone; every request is independent and only reads the shared
/// state.
#[derive(Clone)]
pub struct RollService {
    settings: Arc<Settings>,
    evaluator: Arc<dyn Evaluator>,
}

impl RollService {
    pub fn new(settings: Settings, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            settings: Arc::new(settings),
            evaluator,
        }
    }

    /// Service backed by [`TycheEvaluator`].
    pub fn with_default_evaluator(settings: Settings) -> Self {
        Self::new(settings, Arc::new(TycheEvaluator::new()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Split, validate, evaluate and render without delivering.
    pub fn prepare(
        &self,
        request: &RollRequest,
        ctx: &RequestContext,
    ) -> Result<RenderedMessage, RollError> {
        let parsed = split_expression(&request.raw_text, &self.settings.limits)?;
        let outcomes = evaluate_all(self.evaluator.as_ref(), &parsed, &self.settings.evaluator)?;
        let display_name = ctx.display_name(&self.settings.display_name_order);
        let text = render_outcomes(&parsed, &outcomes, display_name, &self.settings.limits);

        let delivery_mode = if request.hidden {
            DeliveryMode::PrivateThenStub
        } else {
            DeliveryMode::Public
        };
        Ok(RenderedMessage {
            text,
            delivery_mode,
        })
    }

    /// Run the explicit roll command or a recognized shorthand.
    ///
    /// Returns the text for the originating channel: the roll result, the
    /// hidden-roll stub, or a user-facing error. Only a failed private send
    /// is an `Err`.
    pub async fn execute(
        &self,
        request: RollRequest,
        ctx: &RequestContext,
        delivery: &dyn ChatDelivery,
    ) -> Result<String, DeliveryError> {
        tracing::debug!(
            user_id = %ctx.user_id,
            hidden = request.hidden,
            "Roll requested"
        );

        let message = match self.prepare(&request, ctx) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(user_id = %ctx.user_id, error = %err, "Roll rejected");
                return err.into_reply();
            }
        };

        let display_name = ctx.display_name(&self.settings.display_name_order);
        dispatch(message, ctx, display_name, delivery).await
    }

    /// Handle one inbound chat message.
    ///
    /// `Ok(None)` means the message is not a roll and belongs to other
    /// handlers. That includes bare die markers of a notation family the
    /// evaluator does not support.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
        ctx: &RequestContext,
        delivery: &dyn ChatDelivery,
    ) -> Result<Option<String>, DeliveryError> {
        let Some((shorthand, request)) =
            classify(&message.text, message.prefix.as_deref(), message.addressed)
        else {
            return Ok(None);
        };
        if let Shorthand::Die { family } = shorthand
            && !self.evaluator.supports_family(family)
        {
            tracing::debug!(%family, "Unsupported notation family, passing on");
            return Ok(None);
        }
        tracing::debug!(?shorthand, payload = %request.raw_text, "Recognized roll");
        self.execute(request, ctx, delivery).await.map(Some)
    }

    /// Convenience for raw chat text: strips the bot mention and detects the
    /// configured prefix before [`handle_message`](Self::handle_message).
    pub async fn handle_chat(
        &self,
        raw: &str,
        ctx: &RequestContext,
        delivery: &dyn ChatDelivery,
    ) -> Result<Option<String>, DeliveryError> {
        let message =
            InboundMessage::from_chat(raw, &self.settings.bot_name, &self.settings.prefixes);
        self.handle_message(&message, ctx, delivery).await
    }
}

impl std::fmt::Debug for RollService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
