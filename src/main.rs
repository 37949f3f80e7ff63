#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use lingobridge::config::Config;
use lingobridge::routing::{
    route_language, route_trigger, LanguageTag, RoutingDecision, TriggerSet,
};
use lingobridge::security::redact;
use lingobridge::{gateway, translate};

/// `lingobridge` - LINE chat bridge between Chinese and Indonesian speakers.
#[derive(Parser, Debug)]
#[command(name = "lingobridge")]
#[command(author = "theonlyhennygod")]
#[command(version)]
#[command(about = "LINE bridge: zh <-> id translation and an AI care assistant.")]
#[command(long_about = None)]
struct Cli {
    /// Directory holding config.toml (default: ~/.lingobridge)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server
    #[command(long_about = "\
Start the webhook server.

Serves POST /callback for LINE webhook deliveries plus GET / and \
GET /health. Requires LINE_CHANNEL_ACCESS_TOKEN and LINE_CHANNEL_SECRET \
(or the matching [line] keys in config.toml).

Examples:
  lingobridge gateway                  # use config defaults
  lingobridge gateway -p 8080          # listen on port 8080
  lingobridge gateway --host 127.0.0.1")]
    Gateway {
        /// Port to listen on; defaults to config gateway.port
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to; defaults to config gateway.host
        #[arg(long)]
        host: Option<String>,
    },

    /// Show how a message would be routed, without replying
    #[command(long_about = "\
Show how a message would be routed, without replying.

With --lang the detected language is taken as given and no network \
call is made. Without it the configured translation service detects \
the language.

Examples:
  lingobridge route \"看護助理 長輩睡不好怎麼辦？\"
  lingobridge route \"Nenek sudah makan\" --lang id")]
    Route {
        /// Message text
        text: String,

        /// Skip detection and treat the text as this language (zh-TW, zh-CN, id, en, ...)
        #[arg(long)]
        lang: Option<String>,
    },

    /// Show effective configuration (secrets redacted)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(config_dir) = &cli.config_dir {
        if config_dir.as_os_str().is_empty() {
            bail!("--config-dir cannot be empty");
        }
    }

    // Initialize logging - respects RUST_LOG env var, defaults to INFO
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = Config::load(cli.config_dir.as_deref()).await?;

    match cli.command {
        Commands::Gateway { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            info!("Starting lingobridge gateway on {host}:{port}");
            gateway::run_gateway(&host, port, config).await
        }

        Commands::Route { text, lang } => {
            let decision = dry_run_route(&config, &text, lang.as_deref()).await?;
            println!("{decision}");
            Ok(())
        }

        Commands::Status => {
            print_status(&config);
            Ok(())
        }
    }
}

/// Same decision the gateway would make, minus the reply.
async fn dry_run_route(config: &Config, text: &str, lang: Option<&str>) -> Result<RoutingDecision> {
    let text = text.trim();
    if text.is_empty() {
        bail!("Message text cannot be empty");
    }

    let triggers = TriggerSet::new(&config.assistant.triggers);
    if let Some(decision) = route_trigger(text, &triggers, config.ai_enabled()) {
        return Ok(decision);
    }

    let tag = match lang {
        Some(code) => LanguageTag::parse(code),
        None => {
            translate::create_translator(&config.translation.api_base)
                .detect(text)
                .await?
        }
    };
    Ok(route_language(&tag))
}

fn secret_status(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => redact(v),
        None => "(not set)".to_string(),
    }
}

fn print_status(config: &Config) {
    println!("lingobridge status");
    println!();
    println!("Version:     {}", env!("CARGO_PKG_VERSION"));
    println!("Config:      {}", config.config_path.display());
    println!();
    println!("LINE:");
    println!("  API base:          {}", config.line.api_base);
    println!(
        "  Access token:      {}",
        secret_status(config.line.channel_access_token.as_deref())
    );
    println!(
        "  Channel secret:    {}",
        secret_status(config.line.channel_secret.as_deref())
    );
    println!(
        "  Skip own messages: {}",
        if config.line.skip_own_messages { "on" } else { "off" }
    );
    println!();
    println!("Gateway:     {}:{}", config.gateway.host, config.gateway.port);
    println!("Body limit:  {} bytes", config.gateway.max_body_bytes);
    println!();
    println!(
        "Assistant:   {}",
        if config.ai_enabled() { "enabled" } else { "disabled (no API key)" }
    );
    println!("  Provider:          {}", config.default_provider);
    println!("  Model:             {}", config.default_model);
    println!("  Temperature:       {}", config.default_temperature);
    println!("  API key:           {}", secret_status(config.api_key.as_deref()));
    println!("  Triggers:          {}", config.assistant.triggers.join(", "));
    println!();
    println!("Translation: {}", config.translation.api_base);
    println!(
        "  AI translation:    {}",
        if config.ai_translation_enabled() { "on" } else { "off" }
    );
}
