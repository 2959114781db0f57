//! Periodic background alert jobs.
//!
//! Each loop fetches, evaluates, and pushes to subscribed chats. Any
//! failure is logged and the loop continues on the next tick; nothing
//! here may take the process down.

use crate::context::BotContext;
use crate::format;
use heli_engine::{detect_decoys, evaluate_window, overall_trend};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

/// How often the book is scanned for decoy spam.
pub const DECOY_CHECK_INTERVAL: Duration = Duration::from_secs(60);
/// How often the trend digest is pushed.
pub const TREND_DIGEST_INTERVAL: Duration = Duration::from_secs(900);

/// Watch the orderbook and push a decoy summary whenever the alert
/// threshold is crossed.
pub async fn decoy_watch_loop(bot: Bot, ctx: Arc<BotContext>) {
    let mut ticker = tokio::time::interval(DECOY_CHECK_INTERVAL);
    loop {
        ticker.tick().await;
        if let Err(e) = decoy_check(&bot, &ctx).await {
            warn!(error = %e, "decoy watch tick failed");
        }
    }
}

async fn decoy_check(bot: &Bot, ctx: &BotContext) -> Result<(), crate::error::AlertError> {
    let book = ctx.mexc.depth(&ctx.config.symbol, 500).await?;
    let report = detect_decoys(&book, &ctx.config.decoy.to_config());
    if !report.triggers() {
        debug!(decoys = report.decoy_count, "below decoy alert threshold");
        return Ok(());
    }

    info!(decoys = report.decoy_count, "decoy alert threshold crossed");
    broadcast(bot, ctx, &format::decoy(&report)).await;
    Ok(())
}

/// Push a short trend digest for the fastest window.
pub async fn trend_digest_loop(bot: Bot, ctx: Arc<BotContext>) {
    let mut ticker = tokio::time::interval(TREND_DIGEST_INTERVAL);
    loop {
        ticker.tick().await;
        if let Err(e) = trend_digest(&bot, &ctx).await {
            warn!(error = %e, "trend digest tick failed");
        }
    }
}

async fn trend_digest(bot: &Bot, ctx: &BotContext) -> Result<(), crate::error::AlertError> {
    let candles = ctx
        .mexc
        .klines(&ctx.config.symbol, "5m", heli_engine::KLINE_LIMIT as u32)
        .await?;
    let windows: Vec<_> = evaluate_window("5m", &candles).into_iter().collect();
    if windows.is_empty() {
        debug!("not enough candles for the trend digest");
        return Ok(());
    }

    let mut msg = format::trend(&overall_trend(windows));
    if let Some(price) = ctx.price().await? {
        msg.push_str(&format!("\nCurrent price: {:.6} USDT", price));
    }
    broadcast(bot, ctx, &msg).await;
    Ok(())
}

/// Send to every subscribed chat; a failed send skips that chat only.
async fn broadcast(bot: &Bot, ctx: &BotContext, text: &str) {
    let subscribers = ctx.auth.read().await.subscribers();
    for chat in subscribers {
        if let Err(e) = bot.send_message(ChatId(chat), text).await {
            warn!(chat_id = chat, error = %e, "failed to push alert");
        }
    }
}
