//! The composer controller: owns the draft and runs the submission flow.
//!
//! # Submission
//!
//! `submit` walks `Idle → Submitting → Dispatched | Blocked → Idle`:
//!
//! - Blank (or whitespace-only) text is refused before anything else happens.
//! - The intent (text, mode, current attachments) is encoded into a navigable
//!   target.
//! - The auth gate is asked for full authentication with that target as the
//!   resume point. If it allows, the composer navigates and clears the
//!   attachments. If it defers, nothing else happens here: the gate owns the
//!   resume, and the attachments stay put.
//! - Images still decoding at dispatch are not part of the request. Clearing
//!   abandons them and reports each one to the error sink.
//!
//! The phase is bookkeeping only. Input is never locked while a submission is
//! in progress.
//!
//! # Input
//!
//! Enter commits unless Shift is held; Shift+Enter inserts a newline. Pasted
//! text is inserted verbatim.

use std::sync::Arc;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use derive_more::IsVariant;
use launchpad_protocol::Attachment;
use launchpad_protocol::AttachmentId;
use launchpad_protocol::AuthRequirement;
use launchpad_protocol::ExecutionMode;
use launchpad_protocol::SubmissionIntent;
use launchpad_protocol::intent::CREATE_APP_REASON;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app_event::ComposerEvent;
use crate::app_event_sender::ComposerEventSender;
use crate::attachments::AttachmentErrorSink;
use crate::attachments::AttachmentPipeline;
use crate::attachments::IncomingFile;
use crate::collaborators::AuthGate;
use crate::collaborators::Navigator;
use crate::config::ComposerConfig;
use crate::drag_drop::DragDropCapture;
use crate::drag_drop::DragEvent;
use crate::error::ComposerError;
use crate::placeholder::Placeholder;
use crate::placeholder::PlaceholderAnimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Dispatched,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum SubmitOutcome {
    /// Nothing to submit; no collaborator was consulted.
    Refused,
    /// Navigated to `target`.
    Dispatched { target: String },
    /// The auth gate took over and will resume `target` itself.
    Blocked { target: String },
}

/// Result returned when the user interacts with the input.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    Submitted(SubmitOutcome),
    Edited,
    None,
}

pub struct ComposerCollaborators {
    pub auth_gate: Arc<dyn AuthGate>,
    pub navigator: Arc<dyn Navigator>,
    pub error_sink: Arc<dyn AttachmentErrorSink>,
}

/// Everything a host needs to render the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub text: String,
    pub mode: ExecutionMode,
    pub mode_toggle_visible: bool,
    pub attachment_count: usize,
    /// More attachments than the configured soft limit.
    pub over_attachment_limit: bool,
    pub dragging: bool,
    pub busy: bool,
    pub placeholder: String,
    pub can_submit: bool,
    /// The "images guide the layout but may not be replicated exactly" notice.
    pub show_images_notice: bool,
}

pub struct Composer {
    text: String,
    mode: ExecutionMode,
    agent_mode_enabled: bool,
    phase: SubmissionPhase,
    max_input_rows: u16,
    attachments: AttachmentPipeline,
    drag_drop: DragDropCapture,
    placeholder: Placeholder,
    auth_gate: Arc<dyn AuthGate>,
    navigator: Arc<dyn Navigator>,
    event_tx: ComposerEventSender,
}

impl Composer {
    pub fn new(
        config: ComposerConfig,
        collaborators: ComposerCollaborators,
        event_tx: ComposerEventSender,
    ) -> Result<Self, ComposerError> {
        let ComposerConfig {
            placeholder_phrases,
            placeholder_timing,
            accepted_mime_types,
            attachment_limits,
            agent_mode_enabled,
            max_input_rows,
        } = config;
        let animator = PlaceholderAnimator::new(placeholder_phrases, placeholder_timing)?;

        Ok(Self {
            text: String::new(),
            mode: ExecutionMode::default(),
            agent_mode_enabled,
            phase: SubmissionPhase::Idle,
            max_input_rows: max_input_rows.max(1),
            attachments: AttachmentPipeline::new(
                accepted_mime_types.clone(),
                attachment_limits,
                collaborators.error_sink,
                event_tx.clone(),
            ),
            drag_drop: DragDropCapture::new(accepted_mime_types),
            placeholder: Placeholder::new(animator),
            auth_gate: collaborators.auth_gate,
            navigator: collaborators.navigator,
            event_tx,
        })
    }

    /// Start the placeholder animation. Must be called inside a tokio runtime.
    pub fn mount(&mut self) {
        self.placeholder.mount(self.event_tx.clone());
    }

    /// Stop the placeholder animation and cancel its pending timer.
    pub fn unmount(&mut self) {
        self.placeholder.unmount();
    }

    /// Apply an event produced by the composer's own timers or tasks.
    pub fn handle_event(&mut self, event: ComposerEvent) {
        match event {
            ComposerEvent::PlaceholderTick { generation } => {
                self.placeholder.on_tick(generation);
            }
            ComposerEvent::AttachmentsDecoded(batch) => self.attachments.on_batch_decoded(batch),
        }
    }

    /// Process events until no attachment is decoding.
    pub async fn settle_attachments(&mut self, rx: &mut UnboundedReceiver<ComposerEvent>) {
        while self.attachments.is_busy() {
            let Some(event) = rx.recv().await else {
                break;
            };
            self.handle_event(event);
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn insert_newline(&mut self) {
        self.text.push('\n');
    }

    /// Delete the last character. Returns false when the text was empty.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn handle_paste(&mut self, pasted: &str) {
        self.insert_str(pasted);
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<InputResult, ComposerError> {
        if key.kind == KeyEventKind::Release {
            return Ok(InputResult::None);
        }
        let result = match key {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers,
                ..
            } if modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert_newline();
                InputResult::Edited
            }
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => match self.submit()? {
                SubmitOutcome::Refused => InputResult::None,
                outcome => InputResult::Submitted(outcome),
            },
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => {
                if self.backspace() {
                    InputResult::Edited
                } else {
                    InputResult::None
                }
            }
            KeyEvent {
                code: KeyCode::Char(ch),
                modifiers,
                ..
            } if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.text.push(ch);
                InputResult::Edited
            }
            _ => InputResult::None,
        };
        Ok(result)
    }

    /// Rows the input should occupy at `width` columns.
    pub fn desired_rows(&self, width: u16) -> u16 {
        let lines = textwrap::wrap(&self.text, usize::from(width.max(1))).len();
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .clamp(1, self.max_input_rows)
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_mode_toggle_visible(&self) -> bool {
        self.agent_mode_enabled
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        if !self.agent_mode_enabled {
            tracing::debug!(?mode, "execution mode toggle is disabled");
            return;
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.attachments()
    }

    /// File-picker entry point.
    pub fn add_files(&mut self, files: Vec<IncomingFile>) {
        self.attachments.add_files(files);
    }

    pub fn remove_attachment(&mut self, id: &AttachmentId) -> bool {
        self.attachments.remove_attachment(id)
    }

    pub fn clear_attachments(&mut self) {
        self.attachments.clear_attachments();
    }

    pub fn is_busy(&self) -> bool {
        self.attachments.is_busy()
    }

    pub fn handle_drag_event(&mut self, event: DragEvent) {
        let attachments = &mut self.attachments;
        self.drag_drop
            .handle(event, |files| attachments.add_files(files));
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_drop.is_dragging()
    }

    pub fn placeholder_text(&self) -> &str {
        self.placeholder.animator().visible_text()
    }

    pub fn placeholder_prompt(&self) -> String {
        self.placeholder.animator().prompt()
    }

    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn view(&self) -> ComposerView {
        ComposerView {
            text: self.text.clone(),
            mode: self.mode,
            mode_toggle_visible: self.agent_mode_enabled,
            attachment_count: self.attachments.len(),
            over_attachment_limit: self.attachments.is_over_soft_limit(),
            dragging: self.is_dragging(),
            busy: self.is_busy(),
            placeholder: self.placeholder_prompt(),
            can_submit: self.can_submit(),
            show_images_notice: !self.attachments.is_empty(),
        }
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome, ComposerError> {
        if !self.can_submit() {
            tracing::debug!("submit refused: text is blank");
            return Ok(SubmitOutcome::Refused);
        }

        self.transition(SubmissionPhase::Submitting);
        let intent = SubmissionIntent::new(
            self.text.clone(),
            self.mode,
            self.attachments.attachments().to_vec(),
        );
        let target = match intent.to_target() {
            Ok(target) => target,
            Err(err) => {
                self.transition(SubmissionPhase::Idle);
                return Err(err.into());
            }
        };

        let requirement = AuthRequirement::full(CREATE_APP_REASON, target.clone());
        let outcome = if self.auth_gate.require_auth(&requirement) {
            self.transition(SubmissionPhase::Dispatched);
            self.navigator.navigate(&target);
            self.attachments.clear_attachments();
            SubmitOutcome::Dispatched { target }
        } else {
            self.transition(SubmissionPhase::Blocked);
            SubmitOutcome::Blocked { target }
        };
        self.transition(SubmissionPhase::Idle);
        Ok(outcome)
    }

    fn transition(&mut self, next: SubmissionPhase) {
        let prior = std::mem::replace(&mut self.phase, next);
        tracing::debug!(?prior, ?next, "composer submission phase transition");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::test_images::png;
    use crate::attachments::test_images::png_file;
    use crate::config::AttachmentLimits;
    use crate::config::PlaceholderTiming;
    use crate::test_support::TestComposer;
    use crate::test_support::test_composer;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    async fn with_two_images(allow: bool) -> TestComposer {
        let mut t = test_composer(ComposerConfig::default(), allow);
        t.composer.add_files(vec![
            IncomingFile::from_bytes("wireframe.png", "image/png", png(1)),
            IncomingFile::from_bytes("palette.png", "image/png", png(2)),
        ]);
        t.composer.settle_attachments(&mut t.rx).await;
        assert_eq!(t.composer.attachments().len(), 2);
        t
    }

    #[test]
    fn blank_text_never_consults_gate_or_navigates() {
        let mut t = test_composer(ComposerConfig::default(), true);
        for text in ["", "   ", "\n\t "] {
            t.composer.set_text(text);
            assert!(!t.composer.can_submit());
            assert_eq!(t.composer.submit().expect("submit"), SubmitOutcome::Refused);
        }
        assert!(t.gate.requests().is_empty());
        assert!(t.navigator.targets().is_empty());
        assert!(t.composer.phase().is_idle());
    }

    #[test]
    fn dispatches_plain_intent_when_gate_allows() {
        let mut t = test_composer(ComposerConfig::default(), true);
        t.composer.set_text("todo list app");

        let outcome = t.composer.submit().expect("submit");
        let expected = "/chat/new?query=todo%20list%20app&agentMode=deterministic";
        assert_eq!(
            outcome,
            SubmitOutcome::Dispatched {
                target: expected.to_string()
            }
        );
        assert_eq!(t.navigator.targets(), vec![expected.to_string()]);
        assert_eq!(
            t.gate.requests(),
            vec![AuthRequirement::full("to create applications", expected)]
        );
        assert_eq!(t.composer.text(), "todo list app");
        assert!(t.composer.phase().is_idle());
    }

    #[tokio::test]
    async fn dispatch_carries_images_in_order_and_clears_them() {
        let mut t = with_two_images(true).await;
        let attached = t.composer.attachments().to_vec();
        t.composer.set_text("a landing page like these");

        let target = match t.composer.submit().expect("submit") {
            SubmitOutcome::Dispatched { target } => target,
            other => panic!("expected dispatch, got {other:?}"),
        };
        assert!(target.contains("&images="));
        let intent = SubmissionIntent::from_target(&target).expect("decode target");
        assert_eq!(intent.attachments, attached);
        assert_eq!(
            intent
                .attachments
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>(),
            vec!["wireframe.png", "palette.png"]
        );
        assert!(t.composer.attachments().is_empty());
        assert_eq!(t.navigator.targets(), vec![target]);
        assert!(t.errors().is_empty());
    }

    #[tokio::test]
    async fn dispatch_while_decoding_reports_the_abandoned_image() {
        let mut t = test_composer(ComposerConfig::default(), true);
        t.composer.set_text("build it");
        t.composer.add_files(vec![png_file("shot.png", 4)]);
        assert!(t.composer.is_busy());

        let outcome = t.composer.submit().expect("submit");
        assert_eq!(
            outcome,
            SubmitOutcome::Dispatched {
                target: "/chat/new?query=build%20it&agentMode=deterministic".to_string()
            }
        );
        assert!(!t.composer.is_busy());
        assert_eq!(
            t.errors(),
            ["shot.png: discarded before decoding finished"]
        );

        tokio::task::yield_now().await;
        while let Ok(event) = t.rx.try_recv() {
            t.composer.handle_event(event);
        }
        assert!(t.composer.attachments().is_empty());
    }

    #[tokio::test]
    async fn blocked_submission_keeps_decoding_images() {
        let mut t = test_composer(ComposerConfig::default(), false);
        t.composer.set_text("build it");
        t.composer.add_files(vec![png_file("shot.png", 4)]);

        assert!(t.composer.submit().expect("submit").is_blocked());
        assert!(t.composer.is_busy());

        t.composer.settle_attachments(&mut t.rx).await;
        assert_eq!(t.composer.attachments()[0].name, "shot.png");
        assert!(t.errors().is_empty());
    }

    #[tokio::test]
    async fn deferred_submission_keeps_attachments_and_replays_identically() {
        let mut t = with_two_images(false).await;
        t.composer.set_text("F1 fantasy game");

        let resume = match t.composer.submit().expect("submit") {
            SubmitOutcome::Blocked { target } => target,
            other => panic!("expected blocked, got {other:?}"),
        };
        assert!(t.navigator.targets().is_empty());
        assert_eq!(t.composer.attachments().len(), 2);
        assert_eq!(t.gate.requests()[0].resume_target, resume);
        assert!(t.gate.requests()[0].full);

        t.gate.set_allow(true);
        let dispatched = t.composer.submit().expect("submit");
        assert_eq!(dispatched, SubmitOutcome::Dispatched { target: resume });
    }

    #[test]
    fn enter_commits_and_shift_enter_inserts_newline() {
        let mut t = test_composer(ComposerConfig::default(), true);
        assert_eq!(
            t.composer
                .handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE))
                .expect("key"),
            InputResult::None
        );

        for ch in "hi".chars() {
            t.composer
                .handle_key_event(key(KeyCode::Char(ch), KeyModifiers::NONE))
                .expect("key");
        }
        t.composer
            .handle_key_event(key(KeyCode::Enter, KeyModifiers::SHIFT))
            .expect("key");
        t.composer
            .handle_key_event(key(KeyCode::Char('x'), KeyModifiers::CONTROL))
            .expect("key");
        t.composer
            .handle_key_event(key(KeyCode::Char('!'), KeyModifiers::SHIFT))
            .expect("key");
        assert_eq!(t.composer.text(), "hi\n!");
        assert!(t.navigator.targets().is_empty());

        let result = t
            .composer
            .handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .expect("key");
        assert_eq!(
            result,
            InputResult::Submitted(SubmitOutcome::Dispatched {
                target: "/chat/new?query=hi%0A!&agentMode=deterministic".to_string()
            })
        );
    }

    #[test]
    fn modified_enter_without_shift_still_commits() {
        for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT] {
            let mut t = test_composer(ComposerConfig::default(), true);
            t.composer.set_text("quiz app");
            let result = t
                .composer
                .handle_key_event(key(KeyCode::Enter, modifiers))
                .expect("key");
            assert_eq!(
                result,
                InputResult::Submitted(SubmitOutcome::Dispatched {
                    target: "/chat/new?query=quiz%20app&agentMode=deterministic".to_string()
                })
            );
        }

        let mut t = test_composer(ComposerConfig::default(), true);
        t.composer.set_text("quiz app");
        t.composer
            .handle_key_event(key(
                KeyCode::Enter,
                KeyModifiers::SHIFT | KeyModifiers::CONTROL,
            ))
            .expect("key");
        assert_eq!(t.composer.text(), "quiz app\n");
        assert!(t.navigator.targets().is_empty());
    }

    #[test]
    fn key_release_is_ignored() {
        let mut t = test_composer(ComposerConfig::default(), true);
        let mut release = key(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(
            t.composer.handle_key_event(release).expect("key"),
            InputResult::None
        );
        assert_eq!(t.composer.text(), "");
    }

    #[test]
    fn mode_toggle_requires_agent_mode() {
        let mut t = test_composer(ComposerConfig::default(), true);
        t.composer.toggle_mode();
        assert_eq!(t.composer.mode(), ExecutionMode::Deterministic);
        assert!(!t.composer.view().mode_toggle_visible);

        let mut t = test_composer(
            ComposerConfig {
                agent_mode_enabled: true,
                ..ComposerConfig::default()
            },
            true,
        );
        t.composer.toggle_mode();
        t.composer.set_text("budget tracker");
        assert_eq!(
            t.composer.submit().expect("submit"),
            SubmitOutcome::Dispatched {
                target: "/chat/new?query=budget%20tracker&agentMode=agentic".to_string()
            }
        );
    }

    #[test]
    fn desired_rows_grow_with_text_and_clamp() {
        let mut t = test_composer(
            ComposerConfig {
                max_input_rows: 3,
                ..ComposerConfig::default()
            },
            true,
        );
        assert_eq!(t.composer.desired_rows(20), 1);
        t.composer.set_text("one\ntwo");
        assert_eq!(t.composer.desired_rows(20), 2);
        t.composer.set_text("a\nb\nc\nd\ne");
        assert_eq!(t.composer.desired_rows(20), 3);
        assert_eq!(t.composer.desired_rows(0), 3);
    }

    #[tokio::test]
    async fn drag_drop_feeds_the_pipeline() {
        let mut t = test_composer(ComposerConfig::default(), true);
        t.composer.handle_drag_event(DragEvent::Enter);
        t.composer.handle_drag_event(DragEvent::Enter);
        t.composer.handle_drag_event(DragEvent::Leave);
        assert!(t.composer.view().dragging);

        t.composer.handle_drag_event(DragEvent::Drop(vec![
            IncomingFile::from_bytes("shot.png", "image/png", png(5)),
            IncomingFile::from_bytes("readme.md", "text/markdown", b"# hi".to_vec()),
        ]));
        assert!(!t.composer.is_dragging());
        assert!(t.composer.view().busy);

        t.composer.settle_attachments(&mut t.rx).await;
        let view = t.composer.view();
        assert_eq!(view.attachment_count, 1);
        assert!(!view.over_attachment_limit);
        assert!(view.show_images_notice);
        assert!(!view.busy);
        assert_eq!(view.text, "");
    }

    #[test]
    fn pasted_text_is_inserted_verbatim_even_when_it_names_an_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mock.png");
        std::fs::write(&path, png(9)).expect("write image");
        let pasted = path.display().to_string();

        let mut t = test_composer(ComposerConfig::default(), true);
        t.composer.handle_paste(&pasted);
        assert_eq!(t.composer.text(), pasted);
        assert!(!t.composer.is_busy());
        assert!(t.composer.attachments().is_empty());
    }

    #[tokio::test]
    async fn decoded_batches_complete_through_handle_event() {
        let mut t = test_composer(
            ComposerConfig {
                attachment_limits: AttachmentLimits {
                    max_attachments: 1,
                    ..AttachmentLimits::default()
                },
                ..ComposerConfig::default()
            },
            true,
        );
        t.composer.add_files(vec![
            IncomingFile::from_bytes("a.png", "image/png", png(1)),
            IncomingFile::from_bytes("b.png", "image/png", png(2)),
        ]);

        let event = t.rx.recv().await.expect("decoded batch");
        assert!(matches!(event, ComposerEvent::AttachmentsDecoded(_)));
        t.composer.handle_event(event);

        let view = t.composer.view();
        assert!(!view.busy);
        assert_eq!(view.attachment_count, 2);
        assert!(view.over_attachment_limit);
    }

    #[tokio::test(start_paused = true)]
    async fn mounted_composer_animates_placeholder() {
        let mut t = test_composer(
            ComposerConfig {
                placeholder_phrases: vec!["app".to_string()],
                placeholder_timing: PlaceholderTiming::default(),
                ..ComposerConfig::default()
            },
            true,
        );
        assert_eq!(t.composer.placeholder_prompt(), "Create a ");
        t.composer.mount();

        for _ in 0..3 {
            let event = t.rx.recv().await.expect("tick");
            t.composer.handle_event(event);
        }
        assert_eq!(t.composer.placeholder_text(), "app");

        t.composer.unmount();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(t.rx.try_recv().is_err());
        assert_eq!(t.composer.view().placeholder, "Create a app");
    }

    #[test]
    fn empty_placeholder_phrases_fail_construction() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let result = Composer::new(
            ComposerConfig {
                placeholder_phrases: Vec::new(),
                ..ComposerConfig::default()
            },
            ComposerCollaborators {
                auth_gate: Arc::new(crate::test_support::FakeAuthGate::default()),
                navigator: Arc::new(crate::test_support::RecordingNavigator::default()),
                error_sink: Arc::new(crate::LogErrorSink),
            },
            ComposerEventSender::new(tx),
        );
        assert!(matches!(
            result,
            Err(ComposerError::EmptyPlaceholderPhrases)
        ));
    }
}
