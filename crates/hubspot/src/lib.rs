//! HubSpot side of the bridge.
//!
//! OAuth token caching, the CRM/conversations REST client, and routing of
//! custom-channel outbound webhooks.

pub mod auth;
pub mod client;
pub mod outbound;
pub mod types;

pub use {
    auth::TokenCache,
    client::HubSpotClient,
    outbound::{IgnoreReason, OutboundDecision, route},
    types::{OPAQUE_ID_TYPE, OutboundWebhookPayload},
};
