mod check_commands;
mod setup;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "vocalis", about = "Vocalis: Telegram and web-widget bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (defaults to ./vocalis.toml, then the user config dir).
    #[arg(long, global = true, env = "VOCALIS_CONFIG")]
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
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Register the Telegram webhook and initialize transports, then exit.
    Init,
    /// Validate the config file and print diagnostics.
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "vocalis starting");

    match cli.command {
        // Default: start gateway when no subcommand is provided
        None | Some(Commands::Gateway) => {
            let config = setup::load_effective_config(cli.config.as_deref())?;
            let state = setup::build_gateway_state(&config)?;
            #[cfg(feature = "metrics")]
            let state = state.with_metrics_handle(setup::init_metrics(&config)?);

            // CLI args override config values
            let bind = cli.bind.unwrap_or(config.server.bind);
            let port = cli.port.unwrap_or(config.server.port);

            vocalis_gateway::start_gateway(
                Arc::new(state),
                &bind,
                port,
                config.server.register_on_start,
            )
            .await
        },
        Some(Commands::Init) => {
            let config = setup::load_effective_config(cli.config.as_deref())?;
            let state = setup::build_gateway_state(&config)?;
            let reports = state.instance_init().await?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
            Ok(())
        },
        Some(Commands::Check) => check_commands::handle_check(cli.config.as_deref()),
    }
}
