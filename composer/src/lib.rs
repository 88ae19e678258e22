// Keep the library silent; hosts decide what reaches stdout and stderr.
#![deny(clippy::print_stdout, clippy::print_stderr)]

//! Headless core of the landing-page composer.
//!
//! The [`Composer`] owns the draft text, the execution mode and the attached
//! images, animates the placeholder, tracks drag-and-drop, and runs the
//! auth-gated submission. It is single-owner and event driven: timers and
//! decode tasks report back through a [`ComposerEvent`] channel and the host
//! feeds those events into [`Composer::handle_event`].

mod app_event;
mod app_event_sender;
mod attachments;
mod collaborators;
mod config;
mod controller;
mod drag_drop;
mod error;
mod placeholder;

#[cfg(test)]
mod test_support;

pub use app_event::ComposerEvent;
pub use app_event_sender::ComposerEventSender;
pub use attachments::AttachmentErrorSink;
pub use attachments::DecodedBatch;
pub use attachments::FileSource;
pub use attachments::IncomingFile;
pub use attachments::LogErrorSink;
pub use collaborators::AuthGate;
pub use collaborators::Navigator;
pub use config::AttachmentLimits;
pub use config::ComposerConfig;
pub use config::DEFAULT_MAX_INPUT_ROWS;
pub use config::DEFAULT_PLACEHOLDER_PHRASES;
pub use config::PlaceholderTiming;
pub use controller::Composer;
pub use controller::ComposerCollaborators;
pub use controller::ComposerView;
pub use controller::InputResult;
pub use controller::SubmissionPhase;
pub use controller::SubmitOutcome;
pub use drag_drop::DragDropCapture;
pub use drag_drop::DragEvent;
pub use error::AttachmentError;
pub use error::ComposerError;
pub use placeholder::PLACEHOLDER_PREFIX;
pub use placeholder::Placeholder;
pub use placeholder::PlaceholderAnimator;
