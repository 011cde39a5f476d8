//! Vermeer bot server.
//!
//! Long-polls Telegram for commands and answers them with generated images.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use vermeer_bot::{AppContext, BotConfig, Poller, bot_commands, build_reply_channel};
use vermeer_core::init_tracing;
use vermeer_social::telegram::TelegramTransport;

/// Command-line arguments for the bot.
#[derive(Parser, Debug)]
#[command(name = "vermeer-bot")]
#[command(about = "Telegram bot generating images with a txt2img backend")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to ./vermeer.toml when present)
    #[arg(short, long, env = "VERMEER_CONFIG")]
    config: Option<PathBuf>,

    /// Only log chat operations instead of performing them
    #[arg(long)]
    disabled: bool,

    /// Tracing directive used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = BotConfig::load(args.config.as_deref())?;
    if args.disabled {
        config = config.dry_run();
    }
    if let Some(level) = args.log_level {
        config = config.with_log_level(level);
    }
    config.validate()?;

    init_tracing(config.log_level(), *config.log_format())?;
    info!(config_file = ?args.config, disabled = config.telegram().disabled(), "Starting Vermeer bot");

    let transport = Arc::new(TelegramTransport::new(config.telegram())?);
    let channel = build_reply_channel(&config, transport.clone())?;
    let context = Arc::new(AppContext::from_config(&config, channel)?);

    if !*config.telegram().disabled() {
        if let Err(e) = transport.set_my_commands(&bot_commands()).await {
            warn!(error = %e, "Failed to publish command menu");
        }
    }

    let mut poller = Poller::new(transport, context);
    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!(offset = poller.offset(), "Vermeer bot stopped");
    Ok(())
}
