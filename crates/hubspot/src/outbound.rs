//! Routing of HubSpot custom-channel outbound webhooks back to Landbot.

use {
    hublink_channels::{Error, Result},
    hublink_common::OutboundDeliveryTarget,
    std::fmt,
};

use crate::types::{OPAQUE_ID_TYPE, OutboundWebhookPayload};

/// Event types that carry an agent reply.
const ROUTED_EVENT_TYPES: [&str; 2] = ["OUTGOING_CHANNEL_MESSAGE_CREATED", "MESSAGE"];

/// Why an outbound webhook produced no delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Status updates, typing indicators and other non-message events.
    EventType(String),
    NoIdentifier,
    EmptyText,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventType(kind) => write!(f, "unhandled event type {kind}"),
            Self::NoIdentifier => f.write_str("no valid identifier found"),
            Self::EmptyText => f.write_str("empty text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundDecision {
    Deliver(OutboundDeliveryTarget),
    Ignored(IgnoreReason),
}

/// Resolve the Landbot customer and text for an outbound webhook.
///
/// The customer id is taken from the first all-digit integration thread id,
/// else from the first recipient tagged with an opaque-id delivery
/// identifier. A digit string that does not fit a customer id is a
/// [`Error::Validation`]: HubSpot only ever echoes ids we published.
pub fn route(payload: &OutboundWebhookPayload) -> Result<OutboundDecision> {
    if !ROUTED_EVENT_TYPES.contains(&payload.event_type.as_str()) {
        return Ok(OutboundDecision::Ignored(IgnoreReason::EventType(
            payload.event_type.clone(),
        )));
    }

    let Some(raw_id) = resolve_identifier(payload) else {
        return Ok(OutboundDecision::Ignored(IgnoreReason::NoIdentifier));
    };
    let bot_customer_id: i64 = raw_id
        .parse()
        .map_err(|e| Error::validation(format!("invalid customer id {raw_id:?}: {e}")))?;

    let text = [&payload.message.text, &payload.message.rich_text]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty());
    let Some(text) = text else {
        return Ok(OutboundDecision::Ignored(IgnoreReason::EmptyText));
    };

    Ok(OutboundDecision::Deliver(OutboundDeliveryTarget {
        bot_customer_id,
        text: text.clone(),
    }))
}

fn resolve_identifier(payload: &OutboundWebhookPayload) -> Option<&str> {
    payload
        .channel_integration_thread_ids
        .iter()
        .map(|id| id.trim())
        .find(|id| is_numeric(id))
        .or_else(|| {
            payload
                .recipients
                .iter()
                .filter_map(|r| r.delivery_identifier.as_ref())
                .filter(|d| d.identifier_type == OPAQUE_ID_TYPE)
                .map(|d| d.value.trim())
                .find(|value| is_numeric(value))
        })
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
