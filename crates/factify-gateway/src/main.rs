//! factify: WhatsApp fact-check bot
//!
//! Usage:
//!   factify                  - Start the webhook server
//!   factify --check "<text>" - Fact check one message and print the reply
//!   factify --help           - Show help

use factify_core::Config;
use factify_whatsapp::WhatsAppBot;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Webhook server
    Server,
    /// One-shot fact check from the command line
    Check(String),
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args(std::env::args().skip(1));

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("factify {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting factify...");
    tracing::info!("Model: {}", config.gemini.model);
    if config.twilio.is_configured() {
        tracing::info!("Twilio credentials loaded");
    } else {
        tracing::info!("Twilio credentials not set (replies are sent as TwiML)");
    }

    let bot = WhatsAppBot::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create bot: {}", e))?;

    match mode {
        RunMode::Check(text) => {
            let reply = bot.checker().reply_to(&text).await;
            println!("{}", reply);
            Ok(())
        }
        RunMode::Server => run_server(bot).await,
        _ => Ok(()),
    }
}

/// Parse command line arguments
fn parse_args(args: impl IntoIterator<Item = String>) -> RunMode {
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--check" | "-c" => return RunMode::Check(args.collect::<Vec<_>>().join(" ")),
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("factify - WhatsApp fact-check bot");
    println!();
    println!("Usage:");
    println!("  factify                  Start the webhook server");
    println!("  factify --check <text>   Fact check one message and print the reply");
    println!("  factify --help           Show this help message");
    println!("  factify --version        Show version");
    println!();
    println!("Environment Variables:");
    println!("  GEMINI_API_KEY        Gemini API key (required)");
    println!("  GEMINI_MODEL          Model name (default: gemini-2.0-flash)");
    println!("  GEMINI_BASE_URL       Custom Gemini endpoint");
    println!("  FACTCHECK_MODE        grounded or search (default: grounded)");
    println!("  SERPER_API_KEY        Serper API key (required for search mode)");
    println!("  SERPER_BASE_URL       Custom Serper endpoint");
    println!("  TWILIO_ACCOUNT_SID    Twilio account SID (optional)");
    println!("  TWILIO_AUTH_TOKEN     Twilio auth token (optional)");
    println!("  PORT                  Webhook port (default: 5000)");
    println!("  REQUEST_TIMEOUT_SECS  Upstream request timeout (default: 30)");
}

/// Run the webhook server until Ctrl+C
///
/// A bind failure ends the process with an error.
async fn run_server(bot: WhatsAppBot) -> anyhow::Result<()> {
    tracing::info!("Press Ctrl+C to exit");

    bot.start_until(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Webhook server error: {}", e))?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    tracing::info!("Shutting down...");
}
