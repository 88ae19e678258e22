//! Drag-and-drop capture over a composite drop target.
//!
//! Pointer moves across child elements of the drop target produce
//! leave/enter pairs, so "dragging" is tracked as an enter/leave depth rather
//! than a flag. A drop resets the depth and forwards only files whose declared
//! type is accepted; the rest are silently ignored here (the attachment
//! pipeline re-checks the same allow-list on its own).

use launchpad_protocol::ImageMimeType;

use crate::attachments::IncomingFile;

#[derive(Debug)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop(Vec<IncomingFile>),
}

#[derive(Debug, Clone)]
pub struct DragDropCapture {
    depth: u32,
    accept: Vec<ImageMimeType>,
}

impl DragDropCapture {
    pub fn new(accept: Vec<ImageMimeType>) -> Self {
        Self { depth: 0, accept }
    }

    pub fn is_dragging(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn on_drag_enter(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Hosts must keep accepting the drag while it hovers; the depth is unchanged.
    pub fn on_drag_over(&mut self) {}

    pub fn on_drag_leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// End the drag and forward accepted files, if any.
    pub fn on_drop<F>(&mut self, files: Vec<IncomingFile>, forward: F)
    where
        F: FnOnce(Vec<IncomingFile>),
    {
        self.depth = 0;
        let total = files.len();
        let accepted: Vec<IncomingFile> = files
            .into_iter()
            .filter(|file| {
                file.declared_mime()
                    .is_some_and(|mime| self.accept.contains(&mime))
            })
            .collect();
        if accepted.len() < total {
            tracing::debug!(
                dropped = total - accepted.len(),
                "ignoring dropped files with unaccepted types"
            );
        }
        if !accepted.is_empty() {
            forward(accepted);
        }
    }

    pub fn handle<F>(&mut self, event: DragEvent, forward: F)
    where
        F: FnOnce(Vec<IncomingFile>),
    {
        match event {
            DragEvent::Enter => self.on_drag_enter(),
            DragEvent::Over => self.on_drag_over(),
            DragEvent::Leave => self.on_drag_leave(),
            DragEvent::Drop(files) => self.on_drop(files, forward),
        }
    }
}
