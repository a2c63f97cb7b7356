//! Landbot side of the bridge.
//!
//! Inbound webhook classification and the REST client used to deliver
//! HubSpot agent replies back to Landbot customers.

pub mod client;
pub mod inbound;

pub use {
    client::LandbotClient,
    inbound::{Classification, InboundPayload, PayloadForm, SkipReason, classify, parse_payload},
};
