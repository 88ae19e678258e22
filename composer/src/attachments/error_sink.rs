use crate::error::AttachmentError;

/// Receives attachment failures.
///
/// Hosts decide whether these become user-visible notices or log lines; the
/// pipeline only reports them.
pub trait AttachmentErrorSink: Send + Sync {
    fn report(&self, error: AttachmentError);
}

impl<F> AttachmentErrorSink for F
where
    F: Fn(AttachmentError) + Send + Sync,
{
    fn report(&self, error: AttachmentError) {
        self(error)
    }
}

/// Logs failures and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorSink;

impl AttachmentErrorSink for LogErrorSink {
    fn report(&self, error: AttachmentError) {
        tracing::warn!(file = error.file_name(), "attachment rejected: {error}");
    }
}
