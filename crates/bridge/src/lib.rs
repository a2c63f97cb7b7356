//! Reconciliation of inbound Landbot messages against HubSpot.
//!
//! Two mutually exclusive styles implement [`CrmIntegration`]: publishing into
//! a conversations custom channel, or keeping one open ticket per customer.

pub mod channel;
pub mod strategy;
pub mod ticket;

#[cfg(test)]
mod fake;

pub use {
    channel::CustomChannelIntegration,
    strategy::{CrmIntegration, ReconcileOutcome, integration_for},
    ticket::TicketIntegration,
};
