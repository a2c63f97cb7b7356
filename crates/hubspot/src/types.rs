//! HubSpot custom-channel webhook payloads.

use serde::Deserialize;

/// Delivery identifier type the custom channel is registered with. The value
/// is always the Landbot customer id.
pub const OPAQUE_ID_TYPE: &str = "CHANNEL_SPECIFIC_OPAQUE_ID";

/// Body of a custom-channel outbound webhook. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundWebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub channel_id: Option<serde_json::Value>,
    #[serde(default)]
    pub message: OutboundMessageContent,
    #[serde(default)]
    pub channel_integration_thread_ids: Vec<String>,
    #[serde(default)]
    pub recipients: Vec<Participant>,
    #[serde(default)]
    pub senders: Vec<Participant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessageContent {
    pub text: Option<String>,
    pub rich_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: Option<String>,
    pub delivery_identifier: Option<DeliveryIdentifier>,
    pub actor_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryIdentifier {
    #[serde(rename = "type")]
    pub identifier_type: String,
    pub value: String,
}
