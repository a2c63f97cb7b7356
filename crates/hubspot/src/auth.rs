use std::time::{Duration, Instant};

use {
    hublink_channels::{Error, Result},
    hublink_config::HubSpotConfig,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tokio::sync::Mutex,
    tracing::{info, warn},
};

/// Tokens are considered expired this long before HubSpot says they are.
const REFRESH_SKEW: Duration = Duration::from_secs(60);

/// HubSpot's access token lifetime when the response omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 1800;

#[derive(Clone)]
pub struct CachedAccessToken {
    pub token: Secret<String>,
    pub expires_at: Instant,
}

impl CachedAccessToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

/// Holds the HubSpot OAuth access token and refreshes it on demand.
///
/// The check-refresh-store sequence runs under a single async mutex: callers
/// that arrive while a refresh is in flight wait for it and reuse its result
/// instead of issuing their own.
pub struct TokenCache {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: Secret<String>,
    refresh_token: Secret<String>,
    current: Mutex<Option<CachedAccessToken>>,
}

impl TokenCache {
    pub fn new(http: reqwest::Client, config: &HubSpotConfig) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            current: Mutex::new(None),
        }
    }

    /// Return a valid access token, refreshing it first if needed.
    pub async fn get_token(&self) -> Result<Secret<String>> {
        let mut guard = self.current.lock().await;
        if let Some(cached) = guard.as_ref()
            && cached.is_valid()
        {
            return Ok(cached.token.clone());
        }

        // A stale token is never handed out again, even if the refresh fails.
        *guard = None;
        let fresh = self.refresh().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token so the next caller refreshes.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }

    async fn refresh(&self) -> Result<CachedAccessToken> {
        info!("refreshing hubspot access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("refresh_token", self.refresh_token.expose_secret().as_str()),
        ];

        let resp = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::auth(format!("token request failed: {e}")))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "hubspot token refresh rejected");
            return Err(Error::auth(format!("token request failed ({status}): {body}")));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::auth(format!("invalid token response: {e}")))?;
        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::auth("token response carried no access_token"))?;

        let ttl = Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        let expires_at = Instant::now() + ttl.saturating_sub(REFRESH_SKEW);
        info!(expires_in = ttl.as_secs(), "hubspot access token refreshed");

        Ok(CachedAccessToken {
            token: Secret::new(access_token),
            expires_at,
        })
    }
}
