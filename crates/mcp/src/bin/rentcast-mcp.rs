// Standalone MCP server binary

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rentcast_core::{ConfigOverrides, GatewayConfig, QuotaGuard};
use rentcast_mcp::{Dispatcher, McpServer, ToolRegistry};
use rentcast_sdk::RentcastClient;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rentcast-mcp", version)]
#[command(about = "MCP server exposing the RentCast property data API", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "RENTCAST_CONFIG", default_value = "rentcast-mcp.toml")]
    config: PathBuf,

    /// RentCast API key
    #[arg(long, env = "RENTCAST_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL, including the version segment
    #[arg(long, env = "RENTCAST_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "RENTCAST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Maximum provider calls per session
    #[arg(long, env = "RENTCAST_SESSION_CALL_LIMIT")]
    session_call_limit: Option<u64>,

    /// Enforce the per-minute rate limit
    #[arg(long, env = "RENTCAST_RATE_LIMIT_ENABLED")]
    rate_limit_enabled: Option<bool>,

    /// Provider calls allowed in any 60 second window
    #[arg(long, env = "RENTCAST_CALLS_PER_MINUTE")]
    calls_per_minute: Option<u32>,

    /// Log output format (logs always go to stderr)
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            session_call_limit: self.session_call_limit,
            rate_limit_enabled: self.rate_limit_enabled,
            calls_per_minute: self.calls_per_minute,
        }
    }
}

fn init_tracing(format: LogFormat) {
    // stdout carries the protocol
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rentcast=info".into());

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    tracing::info!("RentCast MCP server starting...");

    let config = GatewayConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?
        .with_overrides(args.overrides());
    config.validate().context("Invalid configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_secs = config.timeout_secs,
        session_call_limit = config.quota.session_call_limit,
        rate_limit_enabled = config.quota.rate_limit_enabled,
        calls_per_minute = config.quota.calls_per_minute,
        "Configuration loaded"
    );

    let client =
        RentcastClient::from_gateway_config(&config).context("Failed to create RentCast client")?;
    let quota = Arc::new(QuotaGuard::new(config.quota.clone()));
    let dispatcher = Arc::new(Dispatcher::new(client, quota));

    let registry = ToolRegistry::with_gateway(dispatcher.clone());
    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry);
    server.start().await?;

    let usage = dispatcher.quota();
    tracing::info!(
        session_calls = usage.session_calls,
        session_call_limit = usage.session_call_limit,
        "RentCast MCP server stopped"
    );

    Ok(())
}
