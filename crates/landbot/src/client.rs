use {
    async_trait::async_trait,
    hublink_channels::{BotOutbound, Error, Result},
    hublink_config::LandbotConfig,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

/// Landbot REST client used to deliver agent replies to customers.
pub struct LandbotClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Secret<String>,
}

impl LandbotClient {
    pub fn new(http: reqwest::Client, config: &LandbotConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn send_text_url(&self, customer_id: i64) -> String {
        format!("{}/customers/{customer_id}/send_text/", self.base_url)
    }
}

#[async_trait]
impl BotOutbound for LandbotClient {
    /// Send a text message to a Landbot customer.
    ///
    /// On WhatsApp this only reaches the customer inside the 24h session
    /// window; Landbot reports a failure status otherwise.
    async fn send_text_message(&self, customer_id: i64, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "message": text,
            "extra": { "sender": "agent" },
        });

        let resp = self
            .http
            .post(self.send_text_url(customer_id))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.api_token.expose_secret()),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::bot_platform("send_text", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(customer_id, %status, "landbot send_text rejected");
            return Err(Error::bot_platform("send_text", format!("{status}: {body}")));
        }

        debug!(customer_id, "landbot message delivered");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> LandbotClient {
        let config = LandbotConfig {
            api_token: Secret::new("lb-token".into()),
            api_base_url: format!("{url}/"),
        };
        LandbotClient::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn sends_text_with_agent_tag() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/customers/555/send_text/")
            .match_header("authorization", "Token lb-token")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "message": "hi",
                "extra": { "sender": "agent" },
            })))
            .with_status(201)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        client_for(&server.url())
            .send_text_message(555, "hi")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_bot_platform_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/customers/7/send_text/")
            .with_status(400)
            .with_body("outside session window")
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server.url())
            .send_text_message(7, "late reply")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BotPlatform { .. }));
        assert!(err.to_string().contains("outside session window"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn transport_failure_is_bot_platform_error() {
        let client = client_for("http://127.0.0.1:9");
        let err = client.send_text_message(1, "x").await.unwrap_err();
        assert_eq!(err.reason(), "bot_platform_error");
    }
}
