//! The attachment pipeline: validate, decode, deduplicate and store images.
//!
//! Files arrive in batches from the file picker or a drop.
//! Validation against the allow-list happens synchronously and rejects files
//! one by one. The accepted rest of a batch is decoded on a background task,
//! in batch order, and the finished batch comes back as a
//! [`ComposerEvent::AttachmentsDecoded`]. Batches are appended in the order
//! they complete, never interleaved and never reordering what is already
//! stored.
//!
//! Clearing bumps an epoch and aborts outstanding batches, so a decode that
//! started before a submission can never land in the next composition. Every
//! file of an aborted batch is reported as [`AttachmentError::Abandoned`].

mod error_sink;
mod file;

use std::collections::HashMap;
use std::sync::Arc;

use launchpad_protocol::Attachment;
use launchpad_protocol::AttachmentId;
use launchpad_protocol::ImageMimeType;
use tokio::task::AbortHandle;

pub use error_sink::AttachmentErrorSink;
pub use error_sink::LogErrorSink;
pub use file::FileSource;
pub use file::IncomingFile;
#[cfg(test)]
pub(crate) use file::test_images;

use crate::app_event::ComposerEvent;
use crate::app_event_sender::ComposerEventSender;
use crate::config::AttachmentLimits;
use crate::error::AttachmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(u64);

/// Decode results for one batch, in the order the files were submitted.
#[derive(Debug)]
pub struct DecodedBatch {
    pub(crate) epoch: u64,
    pub(crate) batch: BatchId,
    pub(crate) results: Vec<Result<Attachment, AttachmentError>>,
}

struct InFlightBatch {
    names: Vec<String>,
    abort: AbortHandle,
}

pub struct AttachmentPipeline {
    attachments: Vec<Attachment>,
    accepted: Vec<ImageMimeType>,
    limits: AttachmentLimits,
    error_sink: Arc<dyn AttachmentErrorSink>,
    event_tx: ComposerEventSender,
    epoch: u64,
    next_batch: u64,
    in_flight: HashMap<BatchId, InFlightBatch>,
}

impl AttachmentPipeline {
    pub fn new(
        accepted: Vec<ImageMimeType>,
        limits: AttachmentLimits,
        error_sink: Arc<dyn AttachmentErrorSink>,
        event_tx: ComposerEventSender,
    ) -> Self {
        Self {
            attachments: Vec::new(),
            accepted,
            limits,
            error_sink,
            event_tx,
            epoch: 0,
            next_batch: 0,
            in_flight: HashMap::new(),
        }
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// True while any accepted file is still being decoded.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn accepts(&self, mime: ImageMimeType) -> bool {
        self.accepted.contains(&mime)
    }

    pub fn is_over_soft_limit(&self) -> bool {
        self.attachments.len() > self.limits.max_attachments
    }

    /// Validate `files` and start decoding the accepted ones.
    ///
    /// Must be called from within a tokio runtime when any file is accepted.
    pub fn add_files(&mut self, files: Vec<IncomingFile>) {
        let mut accepted = Vec::with_capacity(files.len());
        for file in files {
            match file.declared_mime() {
                Some(mime) if self.accepts(mime) => accepted.push((file, mime)),
                _ => self.error_sink.report(AttachmentError::UnsupportedType {
                    name: file.name,
                    mime_type: file.mime_type,
                }),
            }
        }
        if accepted.is_empty() {
            return;
        }

        let batch = BatchId(self.next_batch);
        self.next_batch += 1;
        let epoch = self.epoch;
        let max_bytes = self.limits.max_file_bytes;
        let tx = self.event_tx.clone();
        let names = accepted.iter().map(|(file, _)| file.name.clone()).collect();
        tracing::debug!(
            batch = batch.0,
            files = accepted.len(),
            "decoding attachments"
        );

        let handle = tokio::spawn(async move {
            let mut results = Vec::with_capacity(accepted.len());
            for (file, mime) in accepted {
                results.push(file::decode_file(file, mime, max_bytes).await);
            }
            tx.send(ComposerEvent::AttachmentsDecoded(DecodedBatch {
                epoch,
                batch,
                results,
            }));
        });
        self.in_flight.insert(
            batch,
            InFlightBatch {
                names,
                abort: handle.abort_handle(),
            },
        );
    }

    /// Append a finished batch. Batches from before the last clear are dropped.
    pub(crate) fn on_batch_decoded(&mut self, decoded: DecodedBatch) {
        let DecodedBatch {
            epoch,
            batch,
            results,
        } = decoded;
        if epoch != self.epoch || self.in_flight.remove(&batch).is_none() {
            tracing::debug!(batch = batch.0, "discarding a batch decoded before clear");
            return;
        }

        for result in results {
            match result {
                Ok(attachment) => self.push_unique(attachment),
                Err(err) => self.error_sink.report(err),
            }
        }

        if self.is_over_soft_limit() {
            tracing::warn!(
                count = self.attachments.len(),
                max = self.limits.max_attachments,
                "attachment count is over the configured soft limit"
            );
        }
    }

    fn push_unique(&mut self, attachment: Attachment) {
        if self
            .attachments
            .iter()
            .any(|existing| existing.same_content(&attachment))
        {
            tracing::debug!(file = %attachment.name, "skipping duplicate attachment");
            return;
        }
        self.attachments.push(attachment);
    }

    /// Remove one attachment. Returns false when `id` is not present.
    pub fn remove_attachment(&mut self, id: &AttachmentId) -> bool {
        let Some(index) = self.attachments.iter().position(|a| &a.id == id) else {
            return false;
        };
        self.attachments.remove(index);
        true
    }

    /// Drop every attachment and abandon any batch still decoding.
    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
        self.epoch += 1;

        let mut abandoned: Vec<_> = self.in_flight.drain().collect();
        abandoned.sort_by_key(|(batch, _)| *batch);
        for (batch, in_flight) in abandoned {
            in_flight.abort.abort();
            tracing::debug!(batch = batch.0, "abandoning attachments still decoding");
            for name in in_flight.names {
                self.error_sink.report(AttachmentError::Abandoned { name });
            }
        }
    }
}

impl Drop for AttachmentPipeline {
    fn drop(&mut self) {
        for in_flight in self.in_flight.values() {
            in_flight.abort.abort();
        }
    }
}
