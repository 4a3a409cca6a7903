//! dsw - command-line entry point for the Dev-Server-Workflow MCP gateway.

mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dsw_core::{AdapterConfig, AdapterKind, Config};
use dsw_mcp::adapters::adapter_for;
use dsw_mcp::GatewayContext;

#[derive(Parser, Debug)]
#[command(name = "dsw")]
#[command(author, version, about = "Dev-Server-Workflow MCP gateway", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the gateway for one adapter
    Serve {
        /// github, gitlab, openproject or appflowy
        #[arg(value_parser = parse_adapter)]
        adapter: AdapterKind,

        /// Port to listen on (overrides <ADAPTER>_MCP_PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file to use instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print an adapter's tool descriptors as JSON
    Tools {
        #[arg(value_parser = parse_adapter)]
        adapter: AdapterKind,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Set a value, e.g. `dsw config set github.token ghp_...`
    Set { key: String, value: String },

    /// Print a single value
    Get { key: String },

    /// Show the whole config file with tokens masked
    Show,
}

fn parse_adapter(s: &str) -> Result<AdapterKind, String> {
    s.parse().map_err(|e: dsw_core::Error| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            adapter,
            port,
            config,
        } => serve(adapter, port, config, cli.verbose).await,
        Commands::Tools { adapter } => {
            logging::init_cli(cli.verbose);
            let descriptors = adapter_for(adapter).descriptors();
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
            Ok(())
        }
        Commands::Config { command } => {
            logging::init_cli(cli.verbose);
            run_config(command)
        }
    }
}

async fn serve(
    adapter: AdapterKind,
    port: Option<u16>,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    let file = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut config = AdapterConfig::from_env(adapter, &file)?;
    if let Some(port) = port {
        config.port = port;
    }

    let _guard = logging::init_server(&config, verbose)?;

    let ctx = GatewayContext::from_config(&config)?;
    tracing::info!(
        adapter = %adapter,
        base_url = %config.base_url,
        timeout_ms = config.timeout_ms,
        "Starting MCP gateway"
    );

    dsw_mcp::serve(ctx, &config.listen_addr())
        .await
        .with_context(|| format!("Gateway on {} failed", config.listen_addr()))
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Set {}", key);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load()?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => println!("{} is not set", key),
            }
        }
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("# {}", Config::config_path()?.display());
            let configured = config.configured_adapters();
            if configured.is_empty() {
                println!("# no adapters configured");
            } else {
                println!("# configured: {}", configured.join(", "));
            }
            print!("{}", toml::to_string_pretty(&masked(config))?);
        }
    }
    Ok(())
}

/// Replace every stored token with a placeholder.
fn masked(mut config: Config) -> Config {
    for section in [
        &mut config.github,
        &mut config.gitlab,
        &mut config.openproject,
        &mut config.appflowy,
    ]
    .into_iter()
    .flatten()
    {
        if section.token.is_some() {
            section.token = Some("********".to_string());
        }
    }
    config
}
