//! HELI monitor bot.
//!
//! Telegram bot that watches HeliChain staking activity through the LCD
//! and HELI/USDT market structure on MEXC.

mod config;

use clap::Parser;
use heli_alerts::{jobs, BotContext, MonitorBot};
use std::sync::Arc;
use teloxide::Bot;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// HELI monitor bot CLI
#[derive(Parser, Debug)]
#[command(name = "heli-bot")]
#[command(about = "HeliChain staking and market monitor bot", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Disable the periodic decoy/trend push jobs
    #[arg(long, default_value_t = false)]
    no_jobs: bool,
}

fn init_logging(default_level: &str) {
    // RUST_LOG wins; the CLI flag is the fallback default.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = config::load(&args.config)?;
    info!(
        lcd = %config.lcd_base,
        symbol = %config.symbol,
        "starting HELI monitor bot"
    );

    let token = std::env::var("BOT_TOKEN")
        .map_err(|_| "BOT_TOKEN environment variable is not set")?;
    let bot = Bot::new(token);

    let ctx = Arc::new(BotContext::new(config)?);

    if args.no_jobs {
        info!("periodic alert jobs disabled");
    } else {
        tokio::spawn(jobs::decoy_watch_loop(bot.clone(), Arc::clone(&ctx)));
        tokio::spawn(jobs::trend_digest_loop(bot.clone(), Arc::clone(&ctx)));
    }

    let monitor = Arc::new(MonitorBot::new(bot, ctx));
    monitor.run().await;

    info!("dispatcher stopped, shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["heli-bot"]);
        assert_eq!(args.config, "config.json");
        assert_eq!(args.log_level, "info");
        assert!(!args.no_jobs);
    }

    #[test]
    fn test_default_log_level_is_a_valid_filter() {
        let args = Args::parse_from(["heli-bot"]);
        // EnvFilter::new never fails, but the directive must actually
        // enable info-level events.
        let filter = EnvFilter::new(&args.log_level);
        assert_eq!(filter.to_string(), "info");
    }
}
