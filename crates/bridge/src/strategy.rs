use std::sync::Arc;

use {
    async_trait::async_trait,
    hublink_channels::{CrmApi, Result},
    hublink_common::InboundMessageEvent,
    hublink_config::{BridgeConfig, IntegrationStyle},
};

use crate::{channel::CustomChannelIntegration, ticket::TicketIntegration};

/// What a reconciliation run managed to link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub contact_id: Option<String>,
    pub thread_id: Option<String>,
    pub ticket_id: Option<String>,
    /// Whether the contact ↔ ticket edge was written during this run.
    pub contact_linked: bool,
    /// Whether the ticket was created during this run.
    pub ticket_created: bool,
}

/// How an inbound Landbot message is recorded in HubSpot.
///
/// One implementation is active per deployment, picked from config.
#[async_trait]
pub trait CrmIntegration: Send + Sync {
    fn style(&self) -> IntegrationStyle;

    async fn handle_inbound(&self, event: &InboundMessageEvent) -> Result<ReconcileOutcome>;
}

/// Build the integration selected by `bridge.integration`.
pub fn integration_for(config: &BridgeConfig, crm: Arc<dyn CrmApi>) -> Arc<dyn CrmIntegration> {
    match config.integration {
        IntegrationStyle::CustomChannel => Arc::new(CustomChannelIntegration::new(
            crm,
            config.ticket_link_delay(),
        )),
        IntegrationStyle::Ticket => Arc::new(TicketIntegration::new(crm)),
    }
}

