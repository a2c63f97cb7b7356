use std::sync::Arc;

use {
    async_trait::async_trait,
    hublink_channels::{CrmApi, Error, PublishedMessage, Result},
    hublink_common::{CustomerIdentity, NoteDirection},
    hublink_config::{HubSpotConfig, TicketDefaults},
    reqwest::Method,
    secrecy::ExposeSecret,
    serde_json::{Value, json},
    tracing::{debug, info, warn},
};

use crate::{auth::TokenCache, types::OPAQUE_ID_TYPE};

/// HubSpot-defined association type for note → ticket.
const NOTE_TO_TICKET_ASSOCIATION: u32 = 228;

/// Label used in note bodies to tell where a message came from.
const NOTE_CHANNEL_LABEL: &str = "Landbot";

fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// HubSpot CRM and conversations client.
///
/// Stateless apart from the shared [`TokenCache`]; safe to share across
/// request handlers and background tasks.
pub struct HubSpotClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenCache>,
    channel_id: String,
    channel_account_id: String,
    customer_id_property: String,
    ticket: TicketDefaults,
}

impl HubSpotClient {
    pub fn new(http: reqwest::Client, config: &HubSpotConfig, tokens: Arc<TokenCache>) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            channel_id: config.channel_id.clone(),
            channel_account_id: config.channel_account_id.clone(),
            customer_id_property: config.customer_id_property.clone(),
            ticket: config.ticket.clone(),
        }
    }

    /// Send an authenticated request and decode the JSON response.
    ///
    /// Empty response bodies decode to `Value::Null`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        context: &'static str,
    ) -> Result<Value> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}{path}", self.base_url);

        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(token.expose_secret());
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| Error::crm(context, e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::crm(context, e))?;
        if !status.is_success() {
            return Err(Error::crm(context, format!("{status}: {text}")));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| Error::crm(context, format!("invalid JSON: {e}")))
    }

    /// Run a CRM search and return the id of the first result.
    async fn search_first(
        &self,
        object_type: &str,
        filters: Value,
        properties: &[&str],
        context: &'static str,
    ) -> Result<Option<String>> {
        let body = json!({
            "filterGroups": [{ "filters": filters }],
            "properties": properties,
            "limit": 1,
        });
        let path = format!("/crm/v3/objects/{object_type}/search");
        let resp = self.request(Method::POST, &path, Some(&body), context).await?;
        Ok(resp
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|first| id_of(first.get("id"))))
    }

    async fn create_object(
        &self,
        object_type: &str,
        properties: Value,
        context: &'static str,
    ) -> Result<String> {
        let body = json!({ "properties": properties });
        let path = format!("/crm/v3/objects/{object_type}");
        let resp = self.request(Method::POST, &path, Some(&body), context).await?;
        id_of(resp.get("id")).ok_or_else(|| Error::crm(context, "response carried no id"))
    }
}

/// HubSpot ids show up both as strings and as numbers.
fn id_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl CrmApi for HubSpotClient {
    async fn find_active_ticket(&self, customer_id: i64) -> Option<String> {
        let filters = json!([
            {
                "propertyName": self.customer_id_property,
                "operator": "EQ",
                "value": customer_id.to_string(),
            },
            {
                "propertyName": "hs_pipeline_stage",
                "operator": "NEQ",
                "value": self.ticket.closed_stage,
            },
        ]);
        match self
            .search_first(
                "tickets",
                filters,
                &["subject", "hs_pipeline_stage"],
                "search tickets",
            )
            .await
        {
            Ok(found) => {
                debug!(customer_id, ticket_id = ?found, "active ticket lookup");
                found
            },
            Err(e) => {
                warn!(customer_id, error = %e, "ticket search failed, treating as no ticket");
                None
            },
        }
    }

    async fn get_or_create_contact(
        &self,
        name: &str,
        phone: Option<&str>,
        customer_id: Option<i64>,
    ) -> Result<String> {
        if let Some(phone) = phone {
            let filters = json!([{ "propertyName": "phone", "operator": "EQ", "value": phone }]);
            if let Some(contact_id) = self
                .search_first("contacts", filters, &["firstname", "phone"], "search contacts")
                .await?
            {
                debug!(%contact_id, "contact matched by phone");
                return Ok(contact_id);
            }
        }

        let mut properties = json!({ "firstname": name });
        if let Some(phone) = phone {
            properties["phone"] = json!(phone);
        }
        if let Some(customer_id) = customer_id {
            properties[self.customer_id_property.as_str()] = json!(customer_id.to_string());
        }
        let contact_id = self
            .create_object("contacts", properties, "create contact")
            .await?;
        info!(%contact_id, ?customer_id, "created hubspot contact");
        Ok(contact_id)
    }

    async fn create_ticket(
        &self,
        customer: &CustomerIdentity,
        initial_message: &str,
    ) -> Result<String> {
        let contact_id = match self
            .get_or_create_contact(&customer.name, customer.phone.as_deref(), Some(customer.id))
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(customer_id = customer.id, error = %e, "could not resolve contact for ticket");
                None
            },
        };

        let mut properties = json!({
            "subject": format!("Chat with {}", customer.name),
            "content": initial_message,
            "hs_pipeline": self.ticket.pipeline,
            "hs_pipeline_stage": self.ticket.open_stage,
            "hs_ticket_priority": self.ticket.priority,
        });
        properties[self.customer_id_property.as_str()] = json!(customer.id.to_string());

        let ticket_id = self
            .create_object("tickets", properties, "create ticket")
            .await?;
        info!(%ticket_id, customer_id = customer.id, "created hubspot ticket");

        if let Some(contact_id) = contact_id {
            self.associate_contact_with_ticket(&contact_id, &ticket_id)
                .await;
        }
        Ok(ticket_id)
    }

    async fn add_note_to_ticket(
        &self,
        ticket_id: &str,
        message: &str,
        direction: NoteDirection,
    ) -> Result<()> {
        let properties = json!({
            "hs_note_body": format!("[{direction}] from {NOTE_CHANNEL_LABEL}: {message}"),
            "hs_timestamp": unix_millis().to_string(),
        });
        let note_id = self.create_object("notes", properties, "create note").await?;

        let path = format!(
            "/crm/v4/objects/notes/{}/associations/tickets/{}",
            urlencoding::encode(&note_id),
            urlencoding::encode(ticket_id)
        );
        let body = json!([{
            "associationCategory": "HUBSPOT_DEFINED",
            "associationTypeId": NOTE_TO_TICKET_ASSOCIATION,
        }]);
        self.request(Method::PUT, &path, Some(&body), "associate note")
            .await?;
        debug!(%note_id, ticket_id, %direction, "note added to ticket");
        Ok(())
    }

    async fn publish_message_to_channel(
        &self,
        customer_id: i64,
        text: &str,
        sender_name: &str,
        phone: Option<&str>,
    ) -> Result<PublishedMessage> {
        let thread_key = customer_id.to_string();
        let payload = json!({
            "text": text,
            "channelAccountId": self.channel_account_id,
            "integrationThreadId": thread_key,
            "messageDirection": "INCOMING",
            "senders": [{
                "name": sender_name,
                "deliveryIdentifier": {
                    "type": OPAQUE_ID_TYPE,
                    "value": thread_key,
                },
            }],
        });
        debug!(customer_id, has_phone = phone.is_some(), "publishing to custom channel");

        let path = format!(
            "/conversations/v3/custom-channels/{}/messages",
            urlencoding::encode(&self.channel_id)
        );
        let resp = self
            .request(Method::POST, &path, Some(&payload), "publish message")
            .await?;

        let published = PublishedMessage {
            message_id: id_of(resp.get("id")),
            thread_id: id_of(resp.get("conversationsThreadId"))
                .or_else(|| id_of(resp.get("threadId"))),
        };
        info!(
            customer_id,
            thread_id = ?published.thread_id,
            "message published to hubspot"
        );
        Ok(published)
    }

    async fn get_thread_associated_ticket(&self, thread_id: &str) -> Option<String> {
        let path = format!(
            "/conversations/v3/conversations/threads/{}?association=TICKET",
            urlencoding::encode(thread_id)
        );
        match self
            .request(Method::GET, &path, None, "get thread")
            .await
        {
            Ok(resp) => {
                let ticket_id = id_of(
                    resp.get("threadAssociations")
                        .and_then(|a| a.get("associatedTicketId")),
                );
                if ticket_id.is_none() {
                    debug!(thread_id, "thread has no associated ticket");
                }
                ticket_id
            },
            Err(e) => {
                warn!(thread_id, error = %e, "thread lookup failed");
                None
            },
        }
    }

    async fn associate_contact_with_ticket(&self, contact_id: &str, ticket_id: &str) -> bool {
        let path = format!(
            "/crm/v4/objects/contact/{}/associations/default/ticket/{}",
            urlencoding::encode(contact_id),
            urlencoding::encode(ticket_id)
        );
        match self
            .request(Method::PUT, &path, None, "associate contact")
            .await
        {
            Ok(_) => {
                info!(contact_id, ticket_id, "contact associated with ticket");
                true
            },
            Err(e) => {
                warn!(contact_id, ticket_id, error = %e, "contact association failed");
                false
            },
        }
    }
}
