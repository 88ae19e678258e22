//! Plain data shared between the landing-page composer and its hosts.
//!
//! Nothing here performs I/O; every type round-trips through serde so that an
//! intent interrupted by sign-in can be rebuilt from its navigable target.

pub mod attachment;
pub mod discover;
pub mod execution_mode;
pub mod intent;

pub use attachment::Attachment;
pub use attachment::AttachmentId;
pub use attachment::ImageMimeType;
pub use attachment::SUPPORTED_IMAGE_MIME_TYPES;
pub use execution_mode::ExecutionMode;
pub use intent::AuthRequirement;
pub use intent::IntentError;
pub use intent::SubmissionIntent;
