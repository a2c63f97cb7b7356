//! Landbot inbound webhook payloads and the bridge gate.
//!
//! Landbot reaches us in two shapes: the message hook posts
//! `{"messages": [...]}`, while the direct relay integration posts one flat
//! object carrying `customer` and `message`. Both are resolved here, once,
//! into [`InboundMessageEvent`]s.

use {
    hublink_channels::Result,
    hublink_common::{CustomerIdentity, DEFAULT_CUSTOMER_NAME, InboundMessageEvent, SenderType},
    serde::{Deserialize, Deserializer, de::Error as _},
    serde_json::Value,
    tracing::debug,
};

/// Raw inbound body.
///
/// The form is picked from the presence of a `messages` key. Items stay raw
/// JSON until [`classify`] so one oddly shaped item only skips itself.
#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Message hook: a batch of items under `messages`.
    Hook(Vec<Value>),
    /// Direct relay: a single flat item.
    Direct(Value),
}

impl<'de> Deserialize<'de> for InboundPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut body = Value::deserialize(deserializer)?;
        if !body.is_object() {
            return Err(D::Error::custom("expected a JSON object"));
        }
        match body.get_mut("messages").map(Value::take) {
            Some(Value::Array(items)) => Ok(Self::Hook(items)),
            Some(other) => Err(D::Error::custom(format!(
                "`messages` must be an array, got {other}"
            ))),
            None => Ok(Self::Direct(body)),
        }
    }
}

/// One message item, as Landbot sends it. Every field is optional because the
/// hook mixes customer, bot and agent messages with different shapes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundItem {
    pub sender: Option<ItemSender>,
    pub author_type: Option<String>,
    pub message: Option<Value>,
    pub data: Option<ItemData>,
    pub customer: Option<ItemCustomer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemSender {
    #[serde(rename = "type")]
    pub sender_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemData {
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemCustomer {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub agent_id: Option<Value>,
}

/// Which shape the payload arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadForm {
    Hook,
    Direct,
}

/// Why an item was not bridged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotCustomer,
    NoTakeover,
    EmptyText,
    MissingCustomerId,
    /// The item did not have the expected field shapes.
    Malformed,
}

/// Outcome of classifying one inbound payload.
#[derive(Debug, Clone)]
pub struct Classification {
    pub form: PayloadForm,
    pub events: Vec<InboundMessageEvent>,
    pub skipped: Vec<SkipReason>,
}

/// Parse a raw webhook body.
pub fn parse_payload(body: &[u8]) -> Result<InboundPayload> {
    Ok(serde_json::from_slice(body)?)
}

impl InboundPayload {
    pub fn form(&self) -> PayloadForm {
        match self {
            Self::Hook(_) => PayloadForm::Hook,
            Self::Direct(_) => PayloadForm::Direct,
        }
    }
}

/// Decide which items should be bridged to HubSpot.
///
/// Only customer messages pass. Hook items additionally need an assigned
/// agent (human takeover); direct items are relayed regardless, since the
/// upstream flow already picked them.
pub fn classify(payload: InboundPayload) -> Classification {
    let form = payload.form();
    let items = match payload {
        InboundPayload::Hook(items) => items,
        InboundPayload::Direct(item) => vec![item],
    };

    let mut events = Vec::new();
    let mut skipped = Vec::new();
    for raw in items {
        let item = match serde_json::from_value::<InboundItem>(raw) {
            Ok(item) => item,
            Err(e) => {
                debug!(error = %e, ?form, "inbound item malformed");
                skipped.push(SkipReason::Malformed);
                continue;
            },
        };
        match normalize(item, form) {
            Ok(event) => events.push(event),
            Err(reason) => {
                debug!(?reason, ?form, "inbound item not bridged");
                skipped.push(reason);
            },
        }
    }

    Classification {
        form,
        events,
        skipped,
    }
}

fn normalize(
    item: InboundItem,
    form: PayloadForm,
) -> std::result::Result<InboundMessageEvent, SkipReason> {
    let declared = item
        .sender
        .as_ref()
        .and_then(|s| s.sender_type.as_deref())
        .or(item.author_type.as_deref());
    let sender_type = match (declared, form) {
        (Some(raw), _) => raw.parse::<SenderType>().ok(),
        (None, PayloadForm::Direct) => Some(SenderType::Customer),
        (None, PayloadForm::Hook) => None,
    };
    if sender_type != Some(SenderType::Customer) {
        return Err(SkipReason::NotCustomer);
    }

    let customer = item.customer.unwrap_or_default();
    let agent_assigned = customer.agent_id.as_ref().is_some_and(|v| !v.is_null());
    if !agent_assigned && form == PayloadForm::Hook {
        return Err(SkipReason::NoTakeover);
    }

    let text = text_of(item.message.as_ref())
        .or_else(|| text_of(item.data.as_ref().and_then(|d| d.body.as_ref())))
        .ok_or(SkipReason::EmptyText)?;

    let id = customer
        .id
        .as_ref()
        .and_then(customer_id_of)
        .ok_or(SkipReason::MissingCustomerId)?;

    let name = customer
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());
    let phone = customer.phone.filter(|p| !p.trim().is_empty());

    Ok(InboundMessageEvent {
        sender_type: SenderType::Customer,
        customer: CustomerIdentity::new(id, name, phone),
        agent_assigned,
        text,
    })
}

fn text_of(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(ToString::to_string)
}

fn customer_id_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
