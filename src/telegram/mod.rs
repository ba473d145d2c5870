//! Minimal Telegram Bot API transport: long polling and message sending.

pub mod client;
pub mod types;

pub use client::TelegramClient;
pub use types::{Chat, CommandDescription, Message, Update, User};
