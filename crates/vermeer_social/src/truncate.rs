//! Length limits imposed by the chat platform.

use std::borrow::Cow;

use tracing::warn;

/// Longest message text sent as-is, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Appended to text cut at [`MAX_MESSAGE_CHARS`].
pub const TRUNCATION_SUFFIX: &str = "...(truncated)";

/// Longest media caption accepted by the platform, in characters.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Cut text longer than [`MAX_MESSAGE_CHARS`] and mark it as truncated.
///
/// ```
/// use vermeer_social::{MAX_MESSAGE_CHARS, truncate_message};
///
/// let exact = "a".repeat(MAX_MESSAGE_CHARS);
/// assert_eq!(truncate_message(&exact), exact);
///
/// let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
/// assert!(truncate_message(&long).ends_with("...(truncated)"));
/// ```
pub fn truncate_message(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((cut, _)) => {
            warn!(
                chars = text.chars().count(),
                "Message truncated due to exceeding length limit"
            );
            Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_SUFFIX))
        }
        None => Cow::Borrowed(text),
    }
}

/// Cut a caption to [`MAX_CAPTION_CHARS`].
pub fn truncate_caption(caption: &str) -> Cow<'_, str> {
    match caption.char_indices().nth(MAX_CAPTION_CHARS) {
        Some((cut, _)) => {
            warn!("Caption truncated due to exceeding length limit");
            Cow::Owned(caption[..cut].to_string())
        }
        None => Cow::Borrowed(caption),
    }
}
