use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use launchpad_protocol::AuthRequirement;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;

use crate::AttachmentError;
use crate::ComposerEvent;
use crate::ComposerEventSender;
use crate::collaborators::AuthGate;
use crate::collaborators::Navigator;
use crate::config::ComposerConfig;
use crate::controller::Composer;
use crate::controller::ComposerCollaborators;

#[derive(Default)]
pub(crate) struct FakeAuthGate {
    allow: AtomicBool,
    requests: Mutex<Vec<AuthRequirement>>,
}

impl FakeAuthGate {
    pub(crate) fn set_allow(&self, allow: bool) {
        self.allow.store(allow, Ordering::SeqCst);
    }

    pub(crate) fn requests(&self) -> Vec<AuthRequirement> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl AuthGate for FakeAuthGate {
    fn require_auth(&self, requirement: &AuthRequirement) -> bool {
        self.requests
            .lock()
            .expect("requests lock")
            .push(requirement.clone());
        self.allow.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn targets(&self) -> Vec<String> {
        self.targets.lock().expect("targets lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets
            .lock()
            .expect("targets lock")
            .push(target.to_string());
    }
}

pub(crate) struct TestComposer {
    pub(crate) composer: Composer,
    pub(crate) rx: UnboundedReceiver<ComposerEvent>,
    pub(crate) gate: Arc<FakeAuthGate>,
    pub(crate) navigator: Arc<RecordingNavigator>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl TestComposer {
    /// Attachment errors reported so far, rendered with `Display`.
    pub(crate) fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("errors lock").clone()
    }
}

pub(crate) fn test_composer(config: ComposerConfig, allow: bool) -> TestComposer {
    let (tx, rx) = unbounded_channel();
    let gate = Arc::new(FakeAuthGate::default());
    gate.set_allow(allow);
    let navigator = Arc::new(RecordingNavigator::default());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink_errors = Arc::clone(&errors);
    let collaborators = ComposerCollaborators {
        auth_gate: gate.clone(),
        navigator: navigator.clone(),
        error_sink: Arc::new(move |err: AttachmentError| {
            sink_errors.lock().expect("errors lock").push(err.to_string());
        }),
    };
    let composer = Composer::new(config, collaborators, ComposerEventSender::new(tx))
        .expect("default config builds a composer");
    TestComposer {
        composer,
        rx,
        gate,
        navigator,
        errors,
    }
}
