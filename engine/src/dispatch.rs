//! Delivery gate for rendered messages.

use std::future::Future;
use std::pin::Pin;

use dicer_types::{DeliveryError, DeliveryMode, RenderedMessage, RequestContext};

use crate::format::hidden_stub;

pub type DeliveryFut<'a> = Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;

/// Private-message channel of the host chat platform.
pub trait ChatDelivery: Send + Sync {
    fn send_private<'a>(&'a self, user_id: &'a str, text: &'a str) -> DeliveryFut<'a>;
}

/// Route a rendered message and return the text for the originating channel.
///
/// Public messages come back unchanged. Hidden rolls go to the invoking user
/// first; the public stub is only returned once that send has succeeded.
pub async fn dispatch(
    message: RenderedMessage,
    ctx: &RequestContext,
    display_name: &str,
    delivery: &dyn ChatDelivery,
) -> Result<String, DeliveryError> {
    match message.delivery_mode {
        DeliveryMode::Public => Ok(message.text),
        DeliveryMode::PrivateThenStub => {
            tracing::info!(user_id = %ctx.user_id, "Sending hidden roll privately");
            if let Err(err) = delivery.send_private(&ctx.user_id, &message.text).await {
                tracing::warn!(user_id = %ctx.user_id, error = %err, "Private delivery failed");
                return Err(err);
            }
            Ok(hidden_stub(display_name))
        }
    }
}
