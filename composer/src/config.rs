use std::time::Duration;

use launchpad_protocol::ImageMimeType;
use launchpad_protocol::SUPPORTED_IMAGE_MIME_TYPES;

pub const DEFAULT_PLACEHOLDER_PHRASES: [&str; 3] = [
    "todo list app",
    "F1 fantasy game",
    "personal finance tracker",
];

/// Cap on the auto-sized input height, in text rows.
pub const DEFAULT_MAX_INPUT_ROWS: u16 = 12;

/// Delays between placeholder animation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderTiming {
    /// Delay before each typed character.
    pub type_interval: Duration,
    /// How long a fully typed phrase stays on screen before erasing starts.
    pub pause: Duration,
    /// Delay before each erased character.
    pub erase_interval: Duration,
}

impl Default for PlaceholderTiming {
    fn default() -> Self {
        Self {
            type_interval: Duration::from_millis(100),
            pause: Duration::from_millis(2000),
            erase_interval: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentLimits {
    /// Soft bound on the number of attachments. Exceeding it is logged and
    /// surfaced to the host, never enforced.
    pub max_attachments: usize,
    /// Files larger than this are rejected while decoding.
    pub max_file_bytes: u64,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_attachments: 10,
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    pub placeholder_phrases: Vec<String>,
    pub placeholder_timing: PlaceholderTiming,
    pub accepted_mime_types: Vec<ImageMimeType>,
    pub attachment_limits: AttachmentLimits,
    /// When false the execution-mode toggle is hidden and the mode stays at
    /// its default.
    pub agent_mode_enabled: bool,
    pub max_input_rows: u16,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            placeholder_phrases: DEFAULT_PLACEHOLDER_PHRASES
                .iter()
                .map(ToString::to_string)
                .collect(),
            placeholder_timing: PlaceholderTiming::default(),
            accepted_mime_types: SUPPORTED_IMAGE_MIME_TYPES.to_vec(),
            attachment_limits: AttachmentLimits::default(),
            agent_mode_enabled: false,
            max_input_rows: DEFAULT_MAX_INPUT_ROWS,
        }
    }
}
