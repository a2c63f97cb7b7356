//! Config schema types (server, landbot, hubspot, bridge).

use std::{fmt, str::FromStr, time::Duration};

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HublinkConfig {
    pub server: ServerConfig,
    pub landbot: LandbotConfig,
    pub hubspot: HubSpotConfig,
    pub bridge: BridgeConfig,
}

/// Webhook server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "0.0.0.0" so tunnels can reach it.
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

/// Landbot API access.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LandbotConfig {
    /// API token sent as `Authorization: Token <api_token>`.
    pub api_token: Secret<String>,
    pub api_base_url: String,
}

impl Default for LandbotConfig {
    fn default() -> Self {
        Self {
            api_token: Secret::new(String::new()),
            api_base_url: "https://api.landbot.io/v1".into(),
        }
    }
}

impl fmt::Debug for LandbotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandbotConfig")
            .field("api_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// HubSpot OAuth app, custom channel and CRM property settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct HubSpotConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub refresh_token: Secret<String>,

    pub api_base_url: String,

    /// OAuth token endpoint. Defaults to `{api_base_url}/oauth/v1/token`.
    pub token_url: Option<String>,

    /// Custom channel id returned by channel registration.
    pub channel_id: String,

    /// Channel account id connected to the inbox.
    pub channel_account_id: String,

    /// Internal name of the contact/ticket property holding the Landbot
    /// customer id.
    pub customer_id_property: String,

    /// Developer API key and app id. Read by the channel registration tooling,
    /// never by the server.
    pub developer_api_key: Option<Secret<String>>,
    pub app_id: Option<String>,

    /// Per-request timeout for HubSpot and Landbot calls.
    pub http_timeout_secs: u64,

    pub ticket: TicketDefaults,
}

impl HubSpotConfig {
    pub fn token_url(&self) -> String {
        self.token_url.clone().unwrap_or_else(|| {
            format!("{}/oauth/v1/token", self.api_base_url.trim_end_matches('/'))
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: Secret::new(String::new()),
            refresh_token: Secret::new(String::new()),
            api_base_url: "https://api.hubapi.com".into(),
            token_url: None,
            channel_id: String::new(),
            channel_account_id: String::new(),
            customer_id_property: "landbot_customer_id".into(),
            developer_api_key: None,
            app_id: None,
            http_timeout_secs: 30,
            ticket: TicketDefaults::default(),
        }
    }
}

impl fmt::Debug for HubSpotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubSpotConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("token_url", &self.token_url)
            .field("channel_id", &self.channel_id)
            .field("channel_account_id", &self.channel_account_id)
            .field("customer_id_property", &self.customer_id_property)
            .field(
                "developer_api_key",
                &self.developer_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("app_id", &self.app_id)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// Pipeline placement for tickets created by the ticket integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketDefaults {
    pub pipeline: String,
    pub open_stage: String,
    /// Stage treated as closed when looking for an active ticket.
    pub closed_stage: String,
    pub priority: String,
}

impl Default for TicketDefaults {
    fn default() -> Self {
        Self {
            pipeline: "0".into(),
            open_stage: "1".into(),
            closed_stage: "4".into(),
            priority: "MEDIUM".into(),
        }
    }
}

/// Which HubSpot model inbound messages are reconciled against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStyle {
    /// Publish into a conversations custom channel.
    #[default]
    CustomChannel,
    /// Keep one open ticket per customer and append notes to it.
    Ticket,
}

impl IntegrationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CustomChannel => "custom_channel",
            Self::Ticket => "ticket",
        }
    }
}

impl fmt::Display for IntegrationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntegrationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "custom_channel" | "channel" => Ok(Self::CustomChannel),
            "ticket" | "tickets" => Ok(Self::Ticket),
            other => Err(format!("unknown integration style: {other}")),
        }
    }
}

/// Reconciliation behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub integration: IntegrationStyle,
    /// How long to wait for HubSpot to create a ticket for a freshly
    /// published thread before trying to link the contact.
    pub ticket_link_delay_secs: u64,
}

impl BridgeConfig {
    pub fn ticket_link_delay(&self) -> Duration {
        Duration::from_secs(self.ticket_link_delay_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            integration: IntegrationStyle::CustomChannel,
            ticket_link_delay_secs: 5,
        }
    }
}
