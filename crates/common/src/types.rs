use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Name used when the bot platform does not send one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Visitor";

/// A bot-platform customer, as observed on an inbound request.
///
/// `id` is the cross-system key: it becomes the HubSpot integration thread id
/// and the value of the customer-id property on contacts and tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerIdentity {
    pub fn new(id: i64, name: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone,
        }
    }
}

/// Who authored an inbound bot-platform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Customer,
    Bot,
    Agent,
}

impl SenderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Bot => "bot",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "bot" => Ok(Self::Bot),
            "agent" => Ok(Self::Agent),
            other => Err(format!("unknown sender type: {other}")),
        }
    }
}

/// A normalized inbound message, ready to be reconciled against the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundMessageEvent {
    pub sender_type: SenderType,
    pub customer: CustomerIdentity,
    pub agent_assigned: bool,
    pub text: String,
}

/// Where a CRM-side reply should be delivered on the bot platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundDeliveryTarget {
    pub bot_customer_id: i64,
    pub text: String,
}

/// Direction label stamped on ticket notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteDirection {
    Incoming,
    /// Agent replies; the bridge itself only writes incoming notes.
    Outgoing,
}

impl fmt::Display for NoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => f.write_str("INCOMING"),
            Self::Outgoing => f.write_str("OUTGOING"),
        }
    }
}
