use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

/// How the builder should carry out a submitted request.
///
/// Sent as the `agentMode` parameter of the new-chat route, so the lowercase
/// spelling is part of the navigable target format.
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Deterministic,
    Agentic,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::Deterministic, ExecutionMode::Agentic];

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Deterministic => "deterministic",
            ExecutionMode::Agentic => "agentic",
        }
    }

    /// The other mode; used by the two-state toggle.
    pub fn toggled(self) -> Self {
        match self {
            ExecutionMode::Deterministic => ExecutionMode::Agentic,
            ExecutionMode::Agentic => ExecutionMode::Deterministic,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }
}
