//! Slot holding the one submission that is waiting for sign-in.

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use launchpad_protocol::AuthRequirement;

use crate::atomic_write::persist_atomically;

pub const PENDING_RESUME_FILE: &str = "pending_resume";

#[derive(Debug, Clone)]
pub struct ResumeStore {
    path: PathBuf,
}

impl ResumeStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(PENDING_RESUME_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remember `requirement`, replacing whatever was deferred before.
    pub fn save(&self, requirement: &AuthRequirement) -> anyhow::Result<()> {
        let mut json = serde_json::to_vec_pretty(requirement)
            .context("serialize pending submission")?;
        json.push(b'\n');
        persist_atomically(&self.path, &json)
    }

    pub fn peek(&self) -> anyhow::Result<Option<AuthRequirement>> {
        let path = self.path.display();
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("read {path}")),
        };
        serde_json::from_slice(&contents)
            .map(Some)
            .with_context(|| format!("parse {path}"))
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        let path = self.path.display();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {path}")),
        }
    }
}
