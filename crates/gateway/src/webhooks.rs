//! Webhook handlers.
//!
//! Landbot inbound always answers 200 (Landbot retries anything else and the
//! bridge is fire-and-forget). HubSpot outbound answers 400 for payloads that
//! cannot be routed so the failure shows up in the developer console.

use std::sync::Arc;

use {
    axum::{
        body::Bytes,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Json},
    },
    hublink_channels::Error,
    hublink_common::{InboundMessageEvent, OutboundDeliveryTarget},
    hublink_hubspot::{IgnoreReason, OutboundDecision, OutboundWebhookPayload, route},
    hublink_landbot::{classify, parse_payload},
    serde_json::{Value, json},
    tracing::{Instrument, debug, error, info, info_span, warn},
};

use crate::{server::AppState, state::GatewayState};

/// `POST /webhook/bot-inbound`
pub async fn bot_inbound_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unparseable landbot webhook");
            return Json(json!({
                "status": "error",
                "reason": e.reason(),
                "detail": e.to_string(),
            }));
        },
    };

    let classification = classify(payload);
    if classification.events.is_empty() {
        debug!(
            form = ?classification.form,
            skipped = classification.skipped.len(),
            "landbot webhook carried nothing to bridge"
        );
        return Json(json!({
            "status": "ignored",
            "skipped": classification.skipped.len(),
        }));
    }

    let bridged = classification.events.len();
    for event in classification.events {
        spawn_reconcile(Arc::clone(&state.gateway), event);
    }
    Json(json!({
        "status": "processed",
        "bridged": bridged,
        "skipped": classification.skipped.len(),
    }))
}

fn spawn_reconcile(gateway: Arc<GatewayState>, event: InboundMessageEvent) {
    let span = info_span!(
        "reconcile",
        customer_id = event.customer.id,
        integration = %gateway.integration.style(),
    );
    tokio::spawn(
        async move {
            match gateway.integration.handle_inbound(&event).await {
                Ok(outcome) => info!(
                    contact_id = outcome.contact_id.as_deref(),
                    thread_id = outcome.thread_id.as_deref(),
                    ticket_id = outcome.ticket_id.as_deref(),
                    contact_linked = outcome.contact_linked,
                    ticket_created = outcome.ticket_created,
                    "inbound message bridged"
                ),
                Err(e) => warn!(error = %e, reason = e.reason(), "inbound message dropped"),
            }
        }
        .instrument(span),
    );
}

/// `POST /webhook/crm-outbound`
pub async fn crm_outbound_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let payload: OutboundWebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unparseable hubspot webhook");
            let e = Error::from(e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "reason": e.reason(), "detail": e.to_string() })),
            );
        },
    };

    match route(&payload) {
        Ok(OutboundDecision::Deliver(target)) => {
            let customer_id = target.bot_customer_id;
            spawn_delivery(Arc::clone(&state.gateway), target);
            (
                StatusCode::OK,
                Json(json!({ "status": "sent", "customer_id": customer_id })),
            )
        },
        Ok(OutboundDecision::Ignored(reason)) => {
            debug!(event_type = %payload.event_type, %reason, "hubspot webhook ignored");
            let mut body = json!({ "status": "ignored", "reason": reason.to_string() });
            if let IgnoreReason::EventType(kind) = reason {
                body["type"] = Value::String(kind);
            }
            (StatusCode::OK, Json(body))
        },
        Err(e @ Error::Validation { .. }) => {
            warn!(error = %e, "hubspot webhook rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "reason": e.reason(), "detail": e.to_string() })),
            )
        },
        Err(e) => {
            error!(error = %e, "hubspot webhook failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "reason": e.reason() })),
            )
        },
    }
}

fn spawn_delivery(gateway: Arc<GatewayState>, target: OutboundDeliveryTarget) {
    let span = info_span!("deliver", customer_id = target.bot_customer_id);
    tokio::spawn(
        async move {
            match gateway
                .bot
                .send_text_message(target.bot_customer_id, &target.text)
                .await
            {
                Ok(()) => info!("agent reply delivered to landbot"),
                Err(e) => warn!(error = %e, reason = e.reason(), "agent reply dropped"),
            }
        }
        .instrument(span),
    );
}
