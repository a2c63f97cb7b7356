//! Ticket integration: one open ticket per customer, one note per message.

use std::sync::Arc;

use {
    async_trait::async_trait,
    hublink_channels::{CrmApi, Result},
    hublink_common::{InboundMessageEvent, NoteDirection},
    hublink_config::IntegrationStyle,
    tracing::info,
};

use crate::strategy::{CrmIntegration, ReconcileOutcome};

pub struct TicketIntegration {
    crm: Arc<dyn CrmApi>,
}

impl TicketIntegration {
    pub fn new(crm: Arc<dyn CrmApi>) -> Self {
        Self { crm }
    }
}

#[async_trait]
impl CrmIntegration for TicketIntegration {
    fn style(&self) -> IntegrationStyle {
        IntegrationStyle::Ticket
    }

    async fn handle_inbound(&self, event: &InboundMessageEvent) -> Result<ReconcileOutcome> {
        let customer = &event.customer;
        let mut outcome = ReconcileOutcome::default();

        let ticket_id = match self.crm.find_active_ticket(customer.id).await {
            Some(ticket_id) => ticket_id,
            None => {
                let ticket_id = self.crm.create_ticket(customer, &event.text).await?;
                info!(customer_id = customer.id, %ticket_id, "opened ticket for customer");
                outcome.ticket_created = true;
                ticket_id
            },
        };

        self.crm
            .add_note_to_ticket(&ticket_id, &event.text, NoteDirection::Incoming)
            .await?;
        outcome.ticket_id = Some(ticket_id);
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::fake::{Call, FakeCrm},
        hublink_common::{CustomerIdentity, SenderType},
    };

    fn event() -> InboundMessageEvent {
        InboundMessageEvent {
            sender_type: SenderType::Customer,
            customer: CustomerIdentity::new(42, "Visitor", None),
            agent_assigned: false,
            text: "need help".into(),
        }
    }

    #[tokio::test]
    async fn appends_note_to_existing_ticket() {
        let crm = Arc::new(FakeCrm {
            active_ticket: Some("t-1".into()),
            ..FakeCrm::default()
        });

        let outcome = TicketIntegration::new(Arc::clone(&crm) as Arc<dyn CrmApi>)
            .handle_inbound(&event())
            .await
            .unwrap();

        assert_eq!(outcome.ticket_id.as_deref(), Some("t-1"));
        assert!(!outcome.ticket_created);
        assert_eq!(crm.calls(), vec![
            Call::FindActiveTicket(42),
            Call::AddNote {
                ticket_id: "t-1".into(),
                message: "need help".into(),
                direction: NoteDirection::Incoming,
            },
        ]);
    }

    #[tokio::test]
    async fn creates_ticket_then_adds_first_note() {
        let crm = Arc::new(FakeCrm {
            created_ticket: Some("t-new".into()),
            ..FakeCrm::default()
        });

        let outcome = TicketIntegration::new(Arc::clone(&crm) as Arc<dyn CrmApi>)
            .handle_inbound(&event())
            .await
            .unwrap();

        assert_eq!(outcome.ticket_id.as_deref(), Some("t-new"));
        assert!(outcome.ticket_created);
        assert_eq!(crm.calls(), vec![
            Call::FindActiveTicket(42),
            Call::CreateTicket {
                customer_id: 42,
                initial_message: "need help".into(),
            },
            Call::AddNote {
                ticket_id: "t-new".into(),
                message: "need help".into(),
                direction: NoteDirection::Incoming,
            },
        ]);
    }

    #[tokio::test]
    async fn never_touches_channel_apis() {
        let crm = Arc::new(FakeCrm {
            created_ticket: Some("t-new".into()),
            ..FakeCrm::default()
        });

        TicketIntegration::new(Arc::clone(&crm) as Arc<dyn CrmApi>)
            .handle_inbound(&event())
            .await
            .unwrap();

        assert!(!crm.calls().iter().any(|c| matches!(
            c,
            Call::Publish { .. } | Call::ThreadTicket(_)
        )));
    }

    #[tokio::test]
    async fn ticket_creation_failure_propagates() {
        let crm = Arc::new(FakeCrm::default());

        let err = TicketIntegration::new(Arc::clone(&crm) as Arc<dyn CrmApi>)
            .handle_inbound(&event())
            .await
            .unwrap_err();

        assert_eq!(err.reason(), "crm_error");
        assert!(!crm.calls().iter().any(|c| matches!(c, Call::AddNote { .. })));
    }
}
