//! Telegram command surface and alert jobs for the HELI monitor bot.
//!
//! This crate provides:
//! - The command handlers behind [`MonitorBot`]
//! - The JSON-file-backed authorization store
//! - Reply formatting, testable without a network
//! - Periodic decoy and trend push jobs

pub mod auth;
pub mod context;
pub mod error;
pub mod format;
pub mod jobs;
pub mod telegram;

pub use auth::AuthStore;
pub use context::{BotContext, MonitorConfig};
pub use error::AlertError;
pub use telegram::MonitorBot;
