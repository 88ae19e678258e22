use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Image content types the composer accepts.
///
/// Both the drop target and the attachment pipeline filter against this list,
/// and an [`Attachment`] can only be built from one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
    #[serde(rename = "image/gif")]
    Gif,
}

pub const SUPPORTED_IMAGE_MIME_TYPES: [ImageMimeType; 4] = [
    ImageMimeType::Png,
    ImageMimeType::Jpeg,
    ImageMimeType::Webp,
    ImageMimeType::Gif,
];

impl ImageMimeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMimeType::Png => "image/png",
            ImageMimeType::Jpeg => "image/jpeg",
            ImageMimeType::Webp => "image/webp",
            ImageMimeType::Gif => "image/gif",
        }
    }

    /// Parse a declared content type such as `image/PNG`.
    pub fn from_mime(value: &str) -> Option<Self> {
        let value = value.trim();
        SUPPORTED_IMAGE_MIME_TYPES
            .into_iter()
            .find(|mime| mime.as_str().eq_ignore_ascii_case(value))
    }

    /// Infer a content type from a file extension (without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(ImageMimeType::Png),
            "jpg" | "jpeg" => Some(ImageMimeType::Jpeg),
            "webp" => Some(ImageMimeType::Webp),
            "gif" => Some(ImageMimeType::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of an attachment within one composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for AttachmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded image ready to travel with a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub mime_type: ImageMimeType,
    /// Standard base64 encoding of the file contents.
    pub data: String,
    /// Original filename.
    pub name: String,
}

impl Attachment {
    pub fn new(mime_type: ImageMimeType, data: String, name: impl Into<String>) -> Self {
        Self {
            id: AttachmentId::new(),
            mime_type,
            data,
            name: name.into(),
        }
    }

    /// Whether both attachments carry the same image payload.
    pub fn same_content(&self, other: &Attachment) -> bool {
        self.mime_type == other.mime_type && self.data == other.data
    }
}
