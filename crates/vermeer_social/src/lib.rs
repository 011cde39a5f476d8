//! Chat surfaces for the Vermeer bot.
//!
//! Generation sessions talk to a [`ReplyChannel`](vermeer_interface::ReplyChannel):
//!
//! - [`LiveReplyChannel`] sends through a [`ChatTransport`](vermeer_interface::ChatTransport),
//!   spacing every operation with a shared rate limiter and truncating long
//!   text.
//! - [`DisabledReplyChannel`] logs each operation and touches nothing, for
//!   dry runs.
//!
//! The [`telegram`] module provides the production transport.

#![warn(missing_docs)]

mod disabled;
mod live;
pub mod telegram;
mod truncate;

pub use disabled::{DisabledMessage, DisabledReplyChannel};
pub use live::{LiveMessage, LiveReplyChannel, MAX_MEDIA_GROUP};
pub use truncate::{
    MAX_CAPTION_CHARS, MAX_MESSAGE_CHARS, TRUNCATION_SUFFIX, truncate_caption, truncate_message,
};
