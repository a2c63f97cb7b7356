mod check_command;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    hublink_channels::CrmApi,
    hublink_config::HublinkConfig,
    hublink_gateway::state::GatewayState,
    hublink_hubspot::{HubSpotClient, TokenCache},
    hublink_landbot::LandbotClient,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "hublink", about = "Hublink: Landbot to HubSpot messaging bridge")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of hublink.toml).
    #[arg(long, global = true, env = "HUBLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server (default when no subcommand is provided).
    Serve,
    /// Validate the configuration and report errors/warnings.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<HublinkConfig> {
    match cli.config {
        Some(ref path) => hublink_config::load_config(path),
        None => Ok(hublink_config::discover_and_load()),
    }
}

async fn serve(cli: Cli, config: HublinkConfig) -> anyhow::Result<()> {
    let result = hublink_config::validate(&config);
    for d in &result.diagnostics {
        warn!(path = %d.path, severity = %d.severity, "{}", d.message);
    }
    if result.has_errors() {
        anyhow::bail!("configuration has errors; run `hublink check` for details");
    }

    let http = reqwest::Client::builder()
        .timeout(config.hubspot.http_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let tokens = Arc::new(TokenCache::new(http.clone(), &config.hubspot));
    let crm: Arc<dyn CrmApi> = Arc::new(HubSpotClient::new(http.clone(), &config.hubspot, tokens));
    let bot = Arc::new(LandbotClient::new(http, &config.landbot));
    let integration = hublink_bridge::integration_for(&config.bridge, crm);

    let bind = cli.bind.unwrap_or(config.server.bind);
    let port = cli.port.unwrap_or(config.server.port);
    hublink_gateway::server::start_gateway(&bind, port, GatewayState::new(bot, integration)).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "hublink starting");

    match cli.command {
        None | Some(Commands::Serve) => {
            let config = load(&cli)?;
            serve(cli, config).await
        },
        Some(Commands::Check) => {
            let config = load(&cli)?;
            check_command::check(&config)
        },
    }
}
