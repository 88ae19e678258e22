//! Events fed back into the composer by its own timers and background tasks.
//!
//! Background work never touches composer state directly. It reports through
//! this channel and the owner applies the result in
//! [`Composer::handle_event`](crate::Composer::handle_event).

use crate::attachments::DecodedBatch;

#[derive(Debug)]
pub enum ComposerEvent {
    /// A scheduled placeholder step is due. Stale generations are ignored.
    PlaceholderTick { generation: u64 },

    /// A batch of accepted files finished decoding.
    AttachmentsDecoded(DecodedBatch),
}
