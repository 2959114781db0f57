//! Error type for the command surface.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
    #[error("feed error: {0}")]
    Feed(#[from] heli_feeds::FeedError),
    #[error("auth store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("auth store decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
