use std::fmt::Display;

/// Crate-wide result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy shared by both platform clients and the workflows that
/// drive them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HubSpot OAuth refresh failed or returned no usable token.
    #[error("hubspot auth failed: {message}")]
    Auth { message: String },

    /// A HubSpot REST call returned a failure status or could not be sent.
    #[error("hubspot request failed: {context}: {detail}")]
    Crm { context: String, detail: String },

    /// A Landbot REST call returned a failure status or could not be sent.
    #[error("landbot request failed: {context}: {detail}")]
    BotPlatform { context: String, detail: String },

    /// An inbound identifier cannot be routed.
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn auth(message: impl Display) -> Self {
        Self::Auth {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn crm(context: impl Into<String>, detail: impl Display) -> Self {
        Self::Crm {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    #[must_use]
    pub fn bot_platform(context: impl Into<String>, detail: impl Display) -> Self {
        Self::BotPlatform {
            context: context.into(),
            detail: detail.to_string(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Display) -> Self {
        Self::Validation {
            message: message.to_string(),
        }
    }

    /// Short machine-readable reason, used in webhook responses.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth_error",
            Self::Crm { .. } => "crm_error",
            Self::BotPlatform { .. } => "bot_platform_error",
            Self::Validation { .. } => "validation_error",
            Self::SerdeJson(_) => "invalid_payload",
        }
    }
}
