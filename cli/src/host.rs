//! Terminal implementations of the composer's host collaborators.

use clap::ValueEnum;
use launchpad_composer::AuthGate;
use launchpad_composer::Navigator;
use launchpad_protocol::AuthRequirement;

use crate::resume_store::ResumeStore;

/// Identity the terminal session is running under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Session {
    #[default]
    Anonymous,
    Guest,
    Full,
}

impl Session {
    pub fn satisfies(self, requirement: &AuthRequirement) -> bool {
        match self {
            Session::Full => true,
            Session::Guest => !requirement.full,
            Session::Anonymous => false,
        }
    }
}

/// Lets actions through when the session is strong enough, otherwise parks
/// the requirement in the resume slot for `launchpad resume`.
pub struct SessionAuthGate {
    session: Session,
    store: ResumeStore,
}

impl SessionAuthGate {
    pub fn new(session: Session, store: ResumeStore) -> Self {
        Self { session, store }
    }
}

impl AuthGate for SessionAuthGate {
    fn require_auth(&self, requirement: &AuthRequirement) -> bool {
        if self.session.satisfies(requirement) {
            return true;
        }
        match self.store.save(requirement) {
            Ok(()) => tracing::info!(
                session = %self.session,
                reason = %requirement.reason,
                "submission deferred until sign-in"
            ),
            Err(err) => tracing::error!("failed to persist deferred submission: {err:#}"),
        }
        false
    }
}

/// Gate for commands that never submit: refuses everything and stores nothing.
#[derive(Debug, Default)]
pub struct PreviewAuthGate;

impl AuthGate for PreviewAuthGate {
    fn require_auth(&self, requirement: &AuthRequirement) -> bool {
        tracing::debug!(reason = %requirement.reason, "preview session refuses submission");
        false
    }
}

/// Prints navigation targets on stdout, one per line.
#[derive(Debug, Default)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, target: &str) {
        println!("{target}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchpad_protocol::intent::CREATE_APP_REASON;
    use pretty_assertions::assert_eq;

    const TARGET: &str = "/chat/new?query=todo&agentMode=deterministic";

    #[test]
    fn session_strength_ordering() {
        let full = AuthRequirement::full(CREATE_APP_REASON, TARGET);
        let guest_ok = AuthRequirement {
            full: false,
            ..full.clone()
        };

        assert!(Session::Full.satisfies(&full));
        assert!(!Session::Guest.satisfies(&full));
        assert!(Session::Guest.satisfies(&guest_ok));
        assert!(!Session::Anonymous.satisfies(&guest_ok));
    }

    #[test]
    fn deferral_persists_requirement() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResumeStore::new(dir.path());
        let gate = SessionAuthGate::new(Session::Guest, store.clone());
        let requirement = AuthRequirement::full(CREATE_APP_REASON, TARGET);

        assert!(!gate.require_auth(&requirement));
        assert_eq!(store.peek().expect("peek"), Some(requirement));
    }

    #[test]
    fn preview_gate_refuses_without_touching_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResumeStore::new(dir.path());

        let requirement = AuthRequirement::full(CREATE_APP_REASON, TARGET);
        assert!(!PreviewAuthGate.require_auth(&requirement));
        assert_eq!(store.peek().expect("peek"), None);
        assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
    }

    #[test]
    fn satisfied_gate_leaves_slot_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResumeStore::new(dir.path());
        let gate = SessionAuthGate::new(Session::Full, store.clone());

        let requirement = AuthRequirement::full(CREATE_APP_REASON, TARGET);
        assert!(gate.require_auth(&requirement));
        assert_eq!(store.peek().expect("peek"), None);
    }
}
