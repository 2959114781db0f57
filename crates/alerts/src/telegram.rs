//! Telegram bot handlers.

use crate::auth::REFUSAL;
use crate::context::BotContext;
use crate::error::AlertError;
use crate::format;
use heli_feeds::LcdApi;
use heli_engine::{
    classify_walls, count_validators, detect_decoys, evaluate_window, overall_trend,
    staking_apy, summarize_book, wallet_summary, WindowTrend, KLINE_LIMIT, TREND_WINDOWS,
};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::warn;

/// Bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and subscribe this chat to alerts")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Check the bot is alive")]
    Ping,
    #[command(description = "Show your user id and access level")]
    Whoami,
    #[command(description = "Grant access. Usage: /grant <id> (admin)")]
    Grant(String),
    #[command(description = "Revoke access. Usage: /revoke <id> (admin)")]
    Revoke(String),
    #[command(description = "Current price")]
    Price,
    #[command(description = "Total token supply")]
    Supply,
    #[command(description = "Bonded / not bonded pool totals")]
    Staked,
    #[command(description = "Bonded ratio")]
    BondedRatio,
    #[command(description = "Estimated staking APY")]
    Apy,
    #[command(description = "Validator set counts")]
    Validators,
    #[command(description = "One validator. Usage: /validatorinfo <valoper>")]
    ValidatorInfo(String),
    #[command(description = "Delegations of a wallet. Usage: /delegations <wallet>")]
    Delegations(String),
    #[command(description = "Unbonding of a wallet. Usage: /unbonding <wallet>")]
    Unbonding(String),
    #[command(description = "Network unbonding total and top wallets")]
    Unstake,
    #[command(description = "Count of wallets currently unbonding")]
    UnbondingWallets,
    #[command(description = "Unbonding release heatmap, next 14 days")]
    Heatmap,
    #[command(description = "Treasury wallet balances")]
    Coreteam,
    #[command(description = "Orderbook totals and pressure")]
    Orderbook,
    #[command(description = "Orderbook flow since the last snapshot")]
    Flow,
    #[command(description = "Support/resistance walls. Usage: /walls [band %]")]
    Walls(String),
    #[command(description = "Scan the book for decoy orders")]
    Detect,
    #[command(description = "Trend across 5m/15m/1h/4h windows")]
    Trend,
    #[command(description = "Latest block status")]
    Status,
}

impl Command {
    /// Commands anyone may run.
    fn is_open(&self) -> bool {
        matches!(
            self,
            Command::Start | Command::Help | Command::Ping | Command::Whoami
        )
    }

    fn is_admin_only(&self) -> bool {
        matches!(self, Command::Grant(_) | Command::Revoke(_))
    }

    /// Network-wide scans get a placeholder message edited in place.
    fn is_slow(&self) -> bool {
        matches!(
            self,
            Command::Unstake
                | Command::UnbondingWallets
                | Command::Heatmap
                | Command::Coreteam
                | Command::Trend
        )
    }
}

/// Telegram bot wrapper.
pub struct MonitorBot {
    bot: Bot,
    ctx: Arc<BotContext>,
}

impl MonitorBot {
    pub fn new(bot: Bot, ctx: Arc<BotContext>) -> Self {
        Self { bot, ctx }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Run the command dispatcher until shutdown.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();
        let handler = Update::filter_message().filter_command::<Command>().endpoint(
            move |bot: Bot, msg: Message, cmd: Command| {
                let this = Arc::clone(&self);
                async move { this.handle_command(bot, msg, cmd).await }
            },
        );

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_command(
        &self,
        bot: Bot,
        msg: Message,
        cmd: Command,
    ) -> Result<(), AlertError> {
        let chat_id = msg.chat.id;
        let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or(0);

        if cmd.is_admin_only() && !self.ctx.is_admin(user_id).await {
            bot.send_message(chat_id, REFUSAL).await?;
            return Ok(());
        }
        if !cmd.is_open() && !cmd.is_admin_only() && !self.ctx.is_allowed(user_id).await {
            bot.send_message(chat_id, REFUSAL).await?;
            return Ok(());
        }

        if cmd.is_slow() {
            let placeholder = bot.send_message(chat_id, "Working, this can take a minute...").await?;
            let text = self.reply_text(&cmd, chat_id, user_id).await;
            bot.edit_message_text(chat_id, placeholder.id, text).await?;
        } else {
            let text = self.reply_text(&cmd, chat_id, user_id).await;
            bot.send_message(chat_id, text).await?;
        }
        Ok(())
    }

    /// Compute the reply body. Data-source failures degrade to an
    /// "unavailable" style message here; only Telegram API errors
    /// propagate out of the handler.
    async fn reply_text(&self, cmd: &Command, chat_id: ChatId, user_id: i64) -> String {
        match self.try_reply_text(cmd, chat_id, user_id).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "command data fetch failed");
                format!("Could not fetch the data right now ({}). Try again later.", e)
            }
        }
    }

    async fn try_reply_text(
        &self,
        cmd: &Command,
        chat_id: ChatId,
        user_id: i64,
    ) -> Result<String, AlertError> {
        let ctx = &self.ctx;
        let symbol = &ctx.config.symbol;

        let text = match cmd {
            Command::Start => {
                ctx.auth.write().await.subscribe(chat_id.0);
                "Bot started. This chat now receives decoy and trend alerts.".to_string()
            }
            Command::Help => Command::descriptions().to_string(),
            Command::Ping => "Bot is alive.".to_string(),
            Command::Whoami => {
                let auth = ctx.auth.read().await;
                format::whoami(user_id, auth.is_allowed(user_id), auth.is_admin(user_id))
            }

            Command::Grant(arg) => match parse_id(arg) {
                Some(id) => {
                    if ctx.auth.write().await.grant(id) {
                        format!("Granted access to {}.", id)
                    } else {
                        format!("{} already has access.", id)
                    }
                }
                None => "Usage: /grant <numeric user id>".to_string(),
            },
            Command::Revoke(arg) => match parse_id(arg) {
                Some(id) => {
                    if ctx.auth.write().await.revoke(id) {
                        format!("Revoked access from {}.", id)
                    } else {
                        format!("{} had no access.", id)
                    }
                }
                None => "Usage: /revoke <numeric user id>".to_string(),
            },

            Command::Price => format::price(symbol, ctx.price().await?),
            Command::Supply => {
                let total = ctx.lcd.total_supply(&ctx.config.denom).await?;
                format::supply(total)
            }
            Command::Staked => {
                let pool = ctx.lcd.staking_pool().await?;
                format::staked(pool.bonded(), pool.not_bonded())
            }
            Command::BondedRatio => {
                let pool = ctx.lcd.staking_pool().await?;
                let supply = ctx.lcd.total_supply(&ctx.config.denom).await?;
                format::bonded_ratio(heli_engine::bonded_ratio_pct(pool.bonded(), supply))
            }
            Command::Apy => {
                let pool = ctx.lcd.staking_pool().await?;
                let supply = ctx.lcd.total_supply(&ctx.config.denom).await?;
                let inflation = ctx.lcd.inflation().await?;
                let validators = ctx.lcd.validators(Some("BOND_STATUS_BONDED")).await?;
                format::apy(staking_apy(inflation, pool.bonded(), supply, &validators).as_ref())
            }
            Command::Validators => {
                let validators = ctx.lcd.validators(None).await?;
                format::validators(&count_validators(&validators))
            }
            Command::ValidatorInfo(arg) => {
                let valoper = arg.trim();
                if valoper.is_empty() {
                    "Usage: /validatorinfo <valoper address>".to_string()
                } else {
                    format::validator_info(ctx.lcd.validator(valoper).await?.as_ref(), valoper)
                }
            }
            Command::Delegations(arg) => {
                let address = arg.trim();
                if address.is_empty() {
                    "Usage: /delegations <wallet address>".to_string()
                } else {
                    format::delegations(address, &ctx.lcd.delegations(address).await?)
                }
            }
            Command::Unbonding(arg) => {
                let address = arg.trim();
                if address.is_empty() {
                    "Usage: /unbonding <wallet address>".to_string()
                } else {
                    format::wallet_unbonding(address, &ctx.lcd.delegator_unbonding(address).await?)
                }
            }

            Command::Unstake => format::unstake(&ctx.network_unbonding().await?),
            Command::UnbondingWallets => {
                format::unbonding_wallets(&ctx.network_unbonding().await?)
            }
            Command::Heatmap => format::heatmap(&ctx.network_unbonding().await?),
            Command::Coreteam => {
                let mut lines = Vec::with_capacity(ctx.config.core_wallets.len());
                for wallet in &ctx.config.core_wallets {
                    match wallet_summary(&ctx.lcd, &wallet.address, &ctx.config.denom).await {
                        Ok(summary) => {
                            lines.push(format::wallet_line(&wallet.address, &wallet.note, &summary))
                        }
                        Err(e) => {
                            warn!(wallet = %wallet.address, error = %e, "core wallet lookup failed");
                            lines.push(format::wallet_error_line(&wallet.address, &wallet.note));
                        }
                    }
                }
                format::coreteam(&lines)
            }

            Command::Orderbook => {
                let book = ctx.mexc.depth(symbol, 500).await?;
                format::book(symbol, &summarize_book(&book))
            }
            Command::Flow => format::flow(ctx.record_flow().await?.as_ref()),
            Command::Walls(arg) => {
                let mut config = ctx.config.walls.to_config();
                if let Some(band) = parse_band_pct(arg) {
                    config.band_pct = band;
                }
                let book = ctx.mexc.depth(symbol, 500).await?;
                let reference = match ctx.price().await? {
                    Some(p) => p,
                    None => match book.mid_price() {
                        Some(p) => p,
                        None => return Ok("No price reference available.".to_string()),
                    },
                };
                format::walls(&classify_walls(&book, reference, &config), config.band_pct)
            }
            Command::Detect => {
                let book = ctx.mexc.depth(symbol, 500).await?;
                format::decoy(&detect_decoys(&book, &ctx.config.decoy.to_config()))
            }
            Command::Trend => {
                let mut windows: Vec<WindowTrend> = Vec::new();
                for (label, interval) in TREND_WINDOWS {
                    match ctx.mexc.klines(symbol, interval, KLINE_LIMIT as u32).await {
                        Ok(candles) => windows.extend(evaluate_window(label, &candles)),
                        Err(e) => warn!(window = label, error = %e, "kline fetch failed"),
                    }
                }
                format::trend(&overall_trend(windows))
            }
            Command::Status => format::status(&ctx.lcd.latest_block().await?),
        };
        Ok(text)
    }
}

fn parse_id(arg: &str) -> Option<i64> {
    arg.trim().parse::<i64>().ok()
}

/// Band argument is given in percent ("5" means ±5%).
fn parse_band_pct(arg: &str) -> Option<f64> {
    let pct = arg.trim().parse::<f64>().ok()?;
    if pct > 0.0 && pct < 100.0 {
        Some(pct / 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_band_pct() {
        assert_eq!(parse_band_pct("5"), Some(0.05));
        assert_eq!(parse_band_pct(" 7.5 "), Some(0.075));
        assert_eq!(parse_band_pct(""), None);
        assert_eq!(parse_band_pct("0"), None);
        assert_eq!(parse_band_pct("150"), None);
        assert_eq!(parse_band_pct("abc"), None);
    }

    #[test]
    fn test_command_gating() {
        assert!(Command::Ping.is_open());
        assert!(Command::Whoami.is_open());
        assert!(!Command::Price.is_open());

        assert!(Command::Grant(String::new()).is_admin_only());
        assert!(Command::Revoke(String::new()).is_admin_only());
        assert!(!Command::Price.is_admin_only());

        assert!(Command::Unstake.is_slow());
        assert!(Command::Heatmap.is_slow());
        assert!(!Command::Price.is_slow());
    }
}
