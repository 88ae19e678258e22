use tokio::sync::mpsc::UnboundedSender;

use crate::app_event::ComposerEvent;

#[derive(Clone, Debug)]
pub struct ComposerEventSender {
    tx: UnboundedSender<ComposerEvent>,
}

impl ComposerEventSender {
    pub fn new(tx: UnboundedSender<ComposerEvent>) -> Self {
        Self { tx }
    }

    /// Send an event to the composer owner.
    ///
    /// A closed channel means the composer was torn down; the event is dropped.
    pub(crate) fn send(&self, event: ComposerEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::debug!("composer event dropped after teardown: {:?}", err.0);
        }
    }
}
