//! Configuration loading, validation and env substitution.
//!
//! Config file: `hublink.toml`, searched in `./` then `~/.config/hublink/`.
//! Supports `${ENV_VAR}` substitution in the raw text, and the well-known
//! `LANDBOT_*` / `HUBSPOT_*` variables override file values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config, parse_config},
    schema::{
        BridgeConfig, HubSpotConfig, HublinkConfig, IntegrationStyle, LandbotConfig,
        ServerConfig, TicketDefaults,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
