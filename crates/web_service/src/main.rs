use clap::Parser;
use std::io;

use copilot_bridge::DEFAULT_INSTRUCTIONS;
use openai_adapter::{Config, DEFAULT_API_BASE, DEFAULT_MODEL};

#[derive(Parser, Debug, Clone)]
#[command(name = "todo-copilot-server")]
#[command(about = "Todo list server with a copilot assistant")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY")]
    api_key: Option<String>,

    /// Model requested when the client does not name one
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// System instructions for the assistant
    #[arg(long, env = "COPILOT_INSTRUCTIONS")]
    instructions: Option<String>,

    /// Log level (overrides the debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.log_level.is_some() {
        // RUST_LOG wins when set
        env_logger::init();
    } else {
        init_logging(cli.debug);
    }

    // Config files and environment first, command line on top.
    let mut config = Config::new();
    if cli.api_base.is_some() {
        config.api_base = cli.api_base.clone();
    }
    if cli.api_key.is_some() {
        config.api_key = cli.api_key.clone();
    }
    if cli.model.is_some() {
        config.model = cli.model.clone();
    }

    let instructions = cli
        .instructions
        .clone()
        .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string());

    log::info!("Starting todo-copilot-server on port {}", cli.port);
    log::info!("Model configuration:");
    log::info!(
        "  Base URL: {}",
        config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    );
    log::info!(
        "  Model: {}",
        config.model.as_deref().unwrap_or(DEFAULT_MODEL)
    );
    log::info!(
        "  API key: {}",
        if config.api_key.is_some() { "set" } else { "not set" }
    );

    if cli.debug {
        log::debug!("Debug mode enabled");
    }

    web_service::server::run(cli.port, config, instructions)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
