//! Gateway: the HTTP surface of the bridge.
//!
//! Lifecycle:
//! 1. The binary builds the platform clients and the CRM integration
//! 2. They are handed to [`state::GatewayState`]
//! 3. [`server::start_gateway`] serves health and the two webhooks
//!
//! Webhook handlers only classify and validate on the request path; every
//! network call to Landbot or HubSpot runs in a spawned task.

pub mod server;
pub mod state;
pub mod webhooks;
