//! Configuration validation.
//!
//! Checks that the credentials and ids required by the selected integration
//! style are present before the server starts taking webhooks.

use {secrecy::ExposeSecret, std::fmt};

use crate::schema::{HublinkConfig, IntegrationStyle};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "hubspot.channel_id"
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics of a given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
pub fn validate(cfg: &HublinkConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if cfg.landbot.api_token.expose_secret().trim().is_empty() {
        result.push(
            Severity::Error,
            "landbot.api_token",
            "missing Landbot API token (LANDBOT_API_TOKEN)",
        );
    }

    let hubspot = &cfg.hubspot;
    for (path, value, env) in [
        ("hubspot.client_id", hubspot.client_id.as_str(), "HUBSPOT_CLIENT_ID"),
        (
            "hubspot.client_secret",
            hubspot.client_secret.expose_secret().as_str(),
            "HUBSPOT_CLIENT_SECRET",
        ),
        (
            "hubspot.refresh_token",
            hubspot.refresh_token.expose_secret().as_str(),
            "HUBSPOT_REFRESH_TOKEN",
        ),
    ] {
        if value.trim().is_empty() {
            result.push(Severity::Error, path, format!("missing value ({env})"));
        }
    }

    if hubspot.customer_id_property.trim().is_empty() {
        result.push(
            Severity::Error,
            "hubspot.customer_id_property",
            "customer id property name must not be empty",
        );
    }

    match cfg.bridge.integration {
        IntegrationStyle::CustomChannel => {
            if hubspot.channel_id.trim().is_empty() {
                result.push(
                    Severity::Error,
                    "hubspot.channel_id",
                    "custom_channel integration requires a channel id (HUBSPOT_CHANNEL_ID)",
                );
            }
            if hubspot.channel_account_id.trim().is_empty() {
                result.push(
                    Severity::Error,
                    "hubspot.channel_account_id",
                    "custom_channel integration requires a channel account id \
                     (HUBSPOT_CHANNEL_ACCOUNT_ID)",
                );
            }
            if cfg.bridge.ticket_link_delay_secs == 0 {
                result.push(
                    Severity::Warning,
                    "bridge.ticket_link_delay_secs",
                    "a zero delay usually runs before HubSpot has created the ticket",
                );
            }
        },
        IntegrationStyle::Ticket => {
            if !hubspot.channel_id.is_empty() {
                result.push(
                    Severity::Warning,
                    "hubspot.channel_id",
                    "ignored by the ticket integration",
                );
            }
        },
    }

    if hubspot.http_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "hubspot.http_timeout_secs",
            "timeout must be at least one second",
        );
    }

    result
}
