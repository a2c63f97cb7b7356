use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    schema::{HublinkConfig, IntegrationStyle},
};

/// Config file name, checked in the working directory then the user config dir.
const CONFIG_FILENAME: &str = "hublink.toml";

/// Load config from the given TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<HublinkConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let mut cfg = parse_config(&substitute_env(&raw))
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Parse a TOML config document without touching the environment.
pub fn parse_config(raw: &str) -> anyhow::Result<HublinkConfig> {
    Ok(toml::from_str(raw)?)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./hublink.toml`
/// 2. `~/.config/hublink/hublink.toml`
///
/// Falls back to defaults plus environment overrides, which is how the
/// bridge is usually deployed.
pub fn discover_and_load() -> HublinkConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using environment");
            },
        }
    } else {
        debug!("no config file found, using environment");
    }
    let mut cfg = HublinkConfig::default();
    apply_env_overrides(&mut cfg);
    cfg
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    config_dir()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .filter(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/hublink/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hublink").map(|d| d.config_dir().to_path_buf())
}

/// Overlay values from the process environment.
pub fn apply_env_overrides(cfg: &mut HublinkConfig) {
    apply_env_overrides_with(cfg, |name| std::env::var(name).ok())
}

pub(crate) fn apply_env_overrides_with(
    cfg: &mut HublinkConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("HUBLINK_BIND") {
        cfg.server.bind = v;
    }
    if let Some(v) = get("HUBLINK_PORT") {
        match v.parse() {
            Ok(port) => cfg.server.port = port,
            Err(_) => warn!(value = %v, "ignoring invalid HUBLINK_PORT"),
        }
    }

    if let Some(v) = get("LANDBOT_API_TOKEN") {
        cfg.landbot.api_token = Secret::new(v);
    }
    if let Some(v) = get("LANDBOT_API_BASE_URL") {
        cfg.landbot.api_base_url = v;
    }

    if let Some(v) = get("HUBSPOT_CLIENT_ID") {
        cfg.hubspot.client_id = v;
    }
    if let Some(v) = get("HUBSPOT_CLIENT_SECRET") {
        cfg.hubspot.client_secret = Secret::new(v);
    }
    if let Some(v) = get("HUBSPOT_REFRESH_TOKEN") {
        cfg.hubspot.refresh_token = Secret::new(v);
    }
    if let Some(v) = get("HUBSPOT_API_BASE_URL") {
        cfg.hubspot.api_base_url = v;
    }
    if let Some(v) = get("HUBSPOT_CHANNEL_ID") {
        cfg.hubspot.channel_id = v;
    }
    if let Some(v) = get("HUBSPOT_CHANNEL_ACCOUNT_ID") {
        cfg.hubspot.channel_account_id = v;
    }
    if let Some(v) = get("HUBSPOT_CUSTOMER_ID_PROPERTY") {
        cfg.hubspot.customer_id_property = v;
    }
    if let Some(v) = get("HUBSPOT_DEVELOPER_API_KEY") {
        cfg.hubspot.developer_api_key = Some(Secret::new(v));
    }
    if let Some(v) = get("HUBSPOT_APP_ID") {
        cfg.hubspot.app_id = Some(v);
    }

    if let Some(v) = get("HUBLINK_INTEGRATION") {
        match v.parse::<IntegrationStyle>() {
            Ok(style) => cfg.bridge.integration = style,
            Err(e) => warn!(error = %e, "ignoring HUBLINK_INTEGRATION"),
        }
    }
    if let Some(v) = get("HUBLINK_TICKET_LINK_DELAY_SECS") {
        match v.parse() {
            Ok(secs) => cfg.bridge.ticket_link_delay_secs = secs,
            Err(_) => warn!(value = %v, "ignoring invalid HUBLINK_TICKET_LINK_DELAY_SECS"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::ExposeSecret, std::collections::HashMap};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut cfg = parse_config(
            r#"
            [hubspot]
            client_id = "from-file"
            channel_id = "1"
            "#,
        )
        .unwrap();

        apply_env_overrides_with(
            &mut cfg,
            env(&[
                ("HUBSPOT_CLIENT_ID", "from-env"),
                ("HUBSPOT_REFRESH_TOKEN", "refresh"),
                ("LANDBOT_API_TOKEN", "lb"),
                ("HUBLINK_INTEGRATION", "ticket"),
                ("HUBLINK_PORT", "9000"),
            ]),
        );

        assert_eq!(cfg.hubspot.client_id, "from-env");
        assert_eq!(cfg.hubspot.channel_id, "1");
        assert_eq!(cfg.hubspot.refresh_token.expose_secret(), "refresh");
        assert_eq!(cfg.landbot.api_token.expose_secret(), "lb");
        assert_eq!(cfg.bridge.integration, IntegrationStyle::Ticket);
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn invalid_and_blank_env_values_are_ignored() {
        let mut cfg = HublinkConfig::default();
        apply_env_overrides_with(
            &mut cfg,
            env(&[
                ("HUBLINK_PORT", "not-a-port"),
                ("HUBLINK_INTEGRATION", "carrier-pigeon"),
                ("HUBSPOT_CHANNEL_ID", "   "),
            ]),
        );
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.bridge.integration, IntegrationStyle::CustomChannel);
        assert!(cfg.hubspot.channel_id.is_empty());
    }

    #[test]
    fn load_config_reads_file_and_substitutes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hublink.toml");
        std::fs::write(
            &path,
            "[hubspot]\nchannel_account_id = \"${HUBLINK_TEST_UNSET_VARIABLE}\"\nchannel_id = \"42\"\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.hubspot.channel_id, "42");
        assert_eq!(
            cfg.hubspot.channel_account_id,
            "${HUBLINK_TEST_UNSET_VARIABLE}"
        );
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hublink.toml");
        std::fs::write(&path, "[server]\nport = \"eighty\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
