//! Media prepared for sending to a chat.

use derive_getters::Getters;

/// A decoded photo with its caption, ready for a media group.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MediaPhoto {
    /// Raw image bytes
    data: Vec<u8>,
    /// Caption shown under the photo
    caption: String,
    /// File name reported to the platform
    file_name: String,
}

impl MediaPhoto {
    /// Creates a photo entry.
    pub fn new(data: Vec<u8>, caption: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            caption: caption.into(),
            file_name: file_name.into(),
        }
    }
}
