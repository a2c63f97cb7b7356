//! Custom-channel integration: publish into a HubSpot conversations inbox.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    hublink_channels::{CrmApi, Result},
    hublink_common::InboundMessageEvent,
    hublink_config::IntegrationStyle,
    tracing::{debug, info, warn},
};

use crate::strategy::{CrmIntegration, ReconcileOutcome};

/// Publishes each message to the custom channel, then links the customer's
/// contact to the ticket HubSpot opens for the thread.
///
/// HubSpot creates that ticket asynchronously, so the link step waits a
/// fixed delay before looking it up. A ticket that has not appeared by then
/// is not retried; the next message for the same thread tries again.
pub struct CustomChannelIntegration {
    crm: Arc<dyn CrmApi>,
    ticket_link_delay: Duration,
}

impl CustomChannelIntegration {
    pub fn new(crm: Arc<dyn CrmApi>, ticket_link_delay: Duration) -> Self {
        Self {
            crm,
            ticket_link_delay,
        }
    }
}

#[async_trait]
impl CrmIntegration for CustomChannelIntegration {
    fn style(&self) -> IntegrationStyle {
        IntegrationStyle::CustomChannel
    }

    async fn handle_inbound(&self, event: &InboundMessageEvent) -> Result<ReconcileOutcome> {
        let customer = &event.customer;
        let mut outcome = ReconcileOutcome::default();

        if let Some(phone) = customer.phone.as_deref() {
            match self
                .crm
                .get_or_create_contact(&customer.name, Some(phone), Some(customer.id))
                .await
            {
                Ok(contact_id) => outcome.contact_id = Some(contact_id),
                Err(e) => {
                    warn!(customer_id = customer.id, error = %e, "contact resolution failed");
                },
            }
        }

        let published = self
            .crm
            .publish_message_to_channel(
                customer.id,
                &event.text,
                &customer.name,
                customer.phone.as_deref(),
            )
            .await?;
        outcome.thread_id = published.thread_id;

        let (Some(thread_id), Some(contact_id)) =
            (outcome.thread_id.as_deref(), outcome.contact_id.as_deref())
        else {
            debug!(customer_id = customer.id, "nothing to link after publish");
            return Ok(outcome);
        };

        tokio::time::sleep(self.ticket_link_delay).await;

        let Some(ticket_id) = self.crm.get_thread_associated_ticket(thread_id).await else {
            info!(customer_id = customer.id, thread_id, "no ticket on thread yet, skipping link");
            return Ok(outcome);
        };
        outcome.contact_linked = self
            .crm
            .associate_contact_with_ticket(contact_id, &ticket_id)
            .await;
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

    fn event(phone: Option<&str>) -> InboundMessageEvent {
        InboundMessageEvent {
            sender_type: SenderType::Customer,
            customer: CustomerIdentity::new(555, "Ana", phone.map(Into::into)),
            agent_assigned: true,
            text: "hola".into(),
        }
    }

    fn integration(crm: &Arc<FakeCrm>) -> CustomChannelIntegration {
        CustomChannelIntegration::new(Arc::clone(crm) as Arc<dyn CrmApi>, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn full_pipeline_links_contact_to_thread_ticket() {
        let crm = Arc::new(FakeCrm {
            contact_id: Some("c-1".into()),
            thread_id: Some("th-1".into()),
            thread_ticket: Some("t-1".into()),
            ..FakeCrm::default()
        });

        let outcome = integration(&crm).handle_inbound(&event(Some("+1555"))).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome {
            contact_id: Some("c-1".into()),
            thread_id: Some("th-1".into()),
            ticket_id: Some("t-1".into()),
            contact_linked: true,
            ticket_created: false,
        });
        assert_eq!(crm.calls(), vec![
            Call::GetOrCreateContact {
                name: "Ana".into(),
                phone: Some("+1555".into()),
                customer_id: Some(555),
            },
            Call::Publish {
                customer_id: 555,
                text: "hola".into(),
                sender_name: "Ana".into(),
            },
            Call::ThreadTicket("th-1".into()),
            Call::Associate("c-1".into(), "t-1".into()),
        ]);
    }

    #[tokio::test]
    async fn without_phone_only_publishes() {
        let crm = Arc::new(FakeCrm {
            thread_id: Some("th-1".into()),
            ..FakeCrm::default()
        });

        let outcome = integration(&crm).handle_inbound(&event(None)).await.unwrap();

        assert_eq!(outcome.thread_id.as_deref(), Some("th-1"));
        assert_eq!(outcome.contact_id, None);
        assert_eq!(crm.calls(), vec![Call::Publish {
            customer_id: 555,
            text: "hola".into(),
            sender_name: "Ana".into(),
        }]);
    }

    #[tokio::test]
    async fn contact_failure_does_not_block_publish() {
        let crm = Arc::new(FakeCrm {
            contact_id: None,
            thread_id: Some("th-1".into()),
            ..FakeCrm::default()
        });

        let outcome = integration(&crm).handle_inbound(&event(Some("+1555"))).await.unwrap();

        assert_eq!(outcome.contact_id, None);
        assert!(crm.calls().iter().any(|c| matches!(c, Call::Publish { .. })));
        assert!(!crm.calls().iter().any(|c| matches!(c, Call::ThreadTicket(_))));
    }

    #[tokio::test]
    async fn publish_failure_aborts() {
        let crm = Arc::new(FakeCrm {
            contact_id: Some("c-1".into()),
            fail_publish: true,
            ..FakeCrm::default()
        });

        let err = integration(&crm).handle_inbound(&event(Some("+1555"))).await.unwrap_err();

        assert_eq!(err.reason(), "crm_error");
        assert!(!crm.calls().iter().any(|c| matches!(c, Call::ThreadTicket(_))));
    }

    #[tokio::test]
    async fn missing_ticket_after_delay_is_not_an_error() {
        let crm = Arc::new(FakeCrm {
            contact_id: Some("c-1".into()),
            thread_id: Some("th-1".into()),
            thread_ticket: None,
            ..FakeCrm::default()
        });

        let outcome = integration(&crm).handle_inbound(&event(Some("+1555"))).await.unwrap();

        assert_eq!(outcome.ticket_id, None);
        assert!(!outcome.contact_linked);
        assert!(!crm.calls().iter().any(|c| matches!(c, Call::Associate(..))));
    }
}
