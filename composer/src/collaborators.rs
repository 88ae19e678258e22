//! Services the composer consumes from its host page.

use launchpad_protocol::AuthRequirement;

/// Decides whether an action may proceed right now.
///
/// Returning `false` means the gate has taken over: it collects credentials
/// and later resumes `requirement.resume_target` itself, possibly from a
/// different process, so the target is all it gets.
pub trait AuthGate: Send + Sync {
    fn require_auth(&self, requirement: &AuthRequirement) -> bool;
}

/// Performs a route transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}
