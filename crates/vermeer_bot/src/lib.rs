//! Orchestration core of the Vermeer image-generation bot.
//!
//! A chat command flows through three stages:
//!
//! 1. [`PayloadPlanner`] parses the command text and plans the request
//!    payloads, expanding prompts when asked to.
//! 2. [`GalleryRenderer`] fetches every payload in order and keeps a single
//!    up-to-date gallery in the chat.
//! 3. [`AppContext`] ties both to the command surface, and [`Poller`] feeds
//!    it from Telegram.
//!
//! # Example
//!
//! ```
//! use vermeer_bot::{Command, ReportMode};
//!
//! let command = Command::parse("/gen_long prompt: a lighthouse batch_count: 2");
//! assert!(matches!(
//!     command,
//!     Some(Command::Generate { mode: ReportMode::Verbose, .. })
//! ));
//! ```

#![warn(missing_docs)]

mod commands;
mod config;
mod context;
mod gallery;
mod planner;
mod poller;

pub use commands::{Command, CommandName, RECEIVED, WELCOME, apology, bot_commands};
pub use config::{BotConfig, ENV_PREFIX, LEGACY_VARIABLES};
pub use context::{AppContext, build_reply_channel};
pub use gallery::{FAILURE_NOTICE, GalleryRenderer, ReportMode, build_gallery};
pub use planner::{PayloadPlanner, base_prompt, sanitize_prompt};
pub use poller::{DEFAULT_BACKOFF, Poller, UpdateSource};
