use std::sync::Arc;

use {hublink_bridge::CrmIntegration, hublink_channels::BotOutbound};

/// Services shared by every request handler.
pub struct GatewayState {
    /// Delivers HubSpot agent replies to Landbot.
    pub bot: Arc<dyn BotOutbound>,
    /// Records inbound Landbot messages in HubSpot.
    pub integration: Arc<dyn CrmIntegration>,
    pub version: String,
}

impl GatewayState {
    pub fn new(bot: Arc<dyn BotOutbound>, integration: Arc<dyn CrmIntegration>) -> Arc<Self> {
        Arc::new(Self {
            bot,
            integration,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
