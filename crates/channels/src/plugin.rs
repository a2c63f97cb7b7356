use {
    async_trait::async_trait,
    hublink_common::{CustomerIdentity, NoteDirection},
};

use crate::Result;

/// Result of publishing an inbound message to the HubSpot custom channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedMessage {
    pub message_id: Option<String>,
    pub thread_id: Option<String>,
}

/// Outbound delivery to a bot-platform customer.
#[async_trait]
pub trait BotOutbound: Send + Sync {
    async fn send_text_message(&self, customer_id: i64, text: &str) -> Result<()>;
}

/// The HubSpot operations the bridge workflows rely on.
///
/// Methods returning `Option` or `bool` fail open: they log and report
/// "nothing found" instead of returning an error.
#[async_trait]
pub trait CrmApi: Send + Sync {
    async fn find_active_ticket(&self, customer_id: i64) -> Option<String>;

    async fn get_or_create_contact(
        &self,
        name: &str,
        phone: Option<&str>,
        customer_id: Option<i64>,
    ) -> Result<String>;

    async fn create_ticket(&self, customer: &CustomerIdentity, initial_message: &str)
    -> Result<String>;

    async fn add_note_to_ticket(
        &self,
        ticket_id: &str,
        message: &str,
        direction: NoteDirection,
    ) -> Result<()>;

    async fn publish_message_to_channel(
        &self,
        customer_id: i64,
        text: &str,
        sender_name: &str,
        phone: Option<&str>,
    ) -> Result<PublishedMessage>;

    async fn get_thread_associated_ticket(&self, thread_id: &str) -> Option<String>;

    async fn associate_contact_with_ticket(&self, contact_id: &str, ticket_id: &str) -> bool;
}
