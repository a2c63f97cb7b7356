//! Scripted in-memory `CrmApi` for workflow tests.

use std::sync::Mutex;

use {
    async_trait::async_trait,
    hublink_channels::{CrmApi, Error, PublishedMessage, Result},
    hublink_common::{CustomerIdentity, NoteDirection},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindActiveTicket(i64),
    GetOrCreateContact {
        name: String,
        phone: Option<String>,
        customer_id: Option<i64>,
    },
    CreateTicket {
        customer_id: i64,
        initial_message: String,
    },
    AddNote {
        ticket_id: String,
        message: String,
        direction: NoteDirection,
    },
    Publish {
        customer_id: i64,
        text: String,
        sender_name: String,
    },
    ThreadTicket(String),
    Associate(String, String),
}

/// `None` in a scripted field makes the matching call fail (or find nothing).
#[derive(Default)]
pub struct FakeCrm {
    pub active_ticket: Option<String>,
    pub contact_id: Option<String>,
    pub created_ticket: Option<String>,
    pub thread_id: Option<String>,
    pub thread_ticket: Option<String>,
    pub fail_publish: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeCrm {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl CrmApi for FakeCrm {
    async fn find_active_ticket(&self, customer_id: i64) -> Option<String> {
        self.record(Call::FindActiveTicket(customer_id));
        self.active_ticket.clone()
    }

    async fn get_or_create_contact(
        &self,
        name: &str,
        phone: Option<&str>,
        customer_id: Option<i64>,
    ) -> Result<String> {
        self.record(Call::GetOrCreateContact {
            name: name.into(),
            phone: phone.map(Into::into),
            customer_id,
        });
        self.contact_id
            .clone()
            .ok_or_else(|| Error::crm("create contact", "scripted failure"))
    }

    async fn create_ticket(
        &self,
        customer: &CustomerIdentity,
        initial_message: &str,
    ) -> Result<String> {
        self.record(Call::CreateTicket {
            customer_id: customer.id,
            initial_message: initial_message.into(),
        });
        self.created_ticket
            .clone()
            .ok_or_else(|| Error::crm("create ticket", "scripted failure"))
    }

    async fn add_note_to_ticket(
        &self,
        ticket_id: &str,
        message: &str,
        direction: NoteDirection,
    ) -> Result<()> {
        self.record(Call::AddNote {
            ticket_id: ticket_id.into(),
            message: message.into(),
            direction,
        });
        Ok(())
    }

    async fn publish_message_to_channel(
        &self,
        customer_id: i64,
        text: &str,
        sender_name: &str,
        _phone: Option<&str>,
    ) -> Result<PublishedMessage> {
        self.record(Call::Publish {
            customer_id,
            text: text.into(),
            sender_name: sender_name.into(),
        });
        if self.fail_publish {
            return Err(Error::crm("publish message", "scripted failure"));
        }
        Ok(PublishedMessage {
            message_id: None,
            thread_id: self.thread_id.clone(),
        })
    }

    async fn get_thread_associated_ticket(&self, thread_id: &str) -> Option<String> {
        self.record(Call::ThreadTicket(thread_id.into()));
        self.thread_ticket.clone()
    }

    async fn associate_contact_with_ticket(&self, contact_id: &str, ticket_id: &str) -> bool {
        self.record(Call::Associate(contact_id.into(), ticket_id.into()));
        true
    }
}
