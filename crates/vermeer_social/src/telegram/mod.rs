//! Telegram Bot API transport.
//!
//! A thin client over `reqwest` covering the methods the bot needs:
//! `sendMessage`, `editMessageText`, `deleteMessage`, `sendMediaGroup`,
//! `getUpdates` and `setMyCommands`.

mod client;
mod config;
mod dto;

pub use client::{PolledMessage, TelegramTransport};
pub use config::TelegramConfig;
pub use dto::{ApiResponse, BotCommand, TelegramChat, TelegramMessage, TelegramUser, Update};
