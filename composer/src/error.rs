use launchpad_protocol::ImageMimeType;
use launchpad_protocol::IntentError;

/// Why a file did not become an attachment.
///
/// These are reported through an
/// [`AttachmentErrorSink`](crate::AttachmentErrorSink); the pipeline never
/// returns them to its caller.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("{name}: unsupported file type `{mime_type}`")]
    UnsupportedType { name: String, mime_type: String },

    #[error("{name}: file is {size} bytes, over the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("{name}: failed to read file")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name}: contents are not a valid {expected} image")]
    Decode { name: String, expected: ImageMimeType },

    /// The attachments were cleared while this file was still decoding.
    #[error("{name}: discarded before decoding finished")]
    Abandoned { name: String },
}

impl AttachmentError {
    pub fn file_name(&self) -> &str {
        match self {
            AttachmentError::UnsupportedType { name, .. }
            | AttachmentError::TooLarge { name, .. }
            | AttachmentError::Read { name, .. }
            | AttachmentError::Decode { name, .. }
            | AttachmentError::Abandoned { name } => name,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("placeholder phrase list must not be empty")]
    EmptyPlaceholderPhrases,

    #[error(transparent)]
    Intent(#[from] IntentError),
}
