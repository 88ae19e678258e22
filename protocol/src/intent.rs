//! Submission intents and their navigable-target encoding.
//!
//! A target string is the only thing handed to the auth gate when a submission
//! has to wait for sign-in, and it may be replayed by a different process after
//! a reload. It therefore carries the whole intent as plain query parameters:
//!
//! ```text
//! /chat/new?query=<text>&agentMode=<mode>[&images=<json array of attachments>]
//! ```
//!
//! `images` is omitted when there are no attachments. Values are escaped like
//! a browser's `encodeURIComponent`, so `!'()*` stay literal.

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::attachment::Attachment;
use crate::execution_mode::ExecutionMode;

pub const NEW_CHAT_ROUTE: &str = "/chat/new";

/// Action description shown by the auth gate when a submission needs sign-in.
pub const CREATE_APP_REASON: &str = "to create applications";

const QUERY_PARAM: &str = "query";
const MODE_PARAM: &str = "agentMode";
const IMAGES_PARAM: &str = "images";

// Only used to resolve relative targets while parsing.
const TARGET_BASE: &str = "http://launchpad.invalid/";

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("failed to encode attachments: {0}")]
    EncodeImages(#[source] serde_json::Error),
    #[error("malformed target: {0}")]
    MalformedTarget(#[from] url::ParseError),
    #[error("target route `{0}` is not /chat/new")]
    WrongRoute(String),
    #[error("target is missing the `{0}` parameter")]
    MissingParameter(&'static str),
    #[error("unknown execution mode `{0}`")]
    UnknownMode(String),
    #[error("malformed images parameter: {0}")]
    MalformedImages(#[source] serde_json::Error),
}

/// What the visitor asked for, captured at the moment of submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionIntent {
    pub query: String,
    pub mode: ExecutionMode,
    pub attachments: Vec<Attachment>,
}

impl SubmissionIntent {
    pub fn new(
        query: impl Into<String>,
        mode: ExecutionMode,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            query: query.into(),
            mode,
            attachments,
        }
    }

    /// Encode the intent as a route plus query string.
    pub fn to_target(&self) -> Result<String, IntentError> {
        let mut target = format!(
            "{NEW_CHAT_ROUTE}?{QUERY_PARAM}={}&{MODE_PARAM}={}",
            encode_component(&self.query),
            encode_component(self.mode.as_str()),
        );
        if !self.attachments.is_empty() {
            let images =
                serde_json::to_string(&self.attachments).map_err(IntentError::EncodeImages)?;
            target.push_str(&format!("&{IMAGES_PARAM}={}", encode_component(&images)));
        }
        Ok(target)
    }

    /// Rebuild an intent from a target produced by [`SubmissionIntent::to_target`].
    ///
    /// A missing `agentMode` falls back to the default mode; a missing `images`
    /// parameter means no attachments.
    pub fn from_target(target: &str) -> Result<Self, IntentError> {
        let url = Url::parse(TARGET_BASE)?.join(target)?;
        if url.path() != NEW_CHAT_ROUTE {
            return Err(IntentError::WrongRoute(url.path().to_string()));
        }

        let mut query = None;
        let mut mode = None;
        let mut images = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                QUERY_PARAM => query = Some(value.into_owned()),
                MODE_PARAM => mode = Some(value.into_owned()),
                IMAGES_PARAM => images = Some(value.into_owned()),
                _ => {}
            }
        }

        let query = query.ok_or(IntentError::MissingParameter(QUERY_PARAM))?;
        let mode = match mode {
            Some(raw) => ExecutionMode::parse(&raw).ok_or(IntentError::UnknownMode(raw))?,
            None => ExecutionMode::default(),
        };
        let attachments = match images {
            Some(raw) => serde_json::from_str(&raw).map_err(IntentError::MalformedImages)?,
            None => Vec::new(),
        };

        Ok(Self {
            query,
            mode,
            attachments,
        })
    }
}

fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    let mut buf = [0; 4];
    for ch in value.chars() {
        if matches!(ch, '!' | '\'' | '(' | ')' | '*') {
            encoded.push(ch);
        } else {
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    encoded
}

/// What an action needs from the auth gate before it may proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequirement {
    /// Require a fully authenticated user; a guest identity is not enough.
    pub full: bool,
    /// Human-readable action description, e.g. "to create applications".
    pub reason: String,
    /// Where to go once credentials are established.
    pub resume_target: String,
}

impl AuthRequirement {
    pub fn full(reason: impl Into<String>, resume_target: impl Into<String>) -> Self {
        Self {
            full: true,
            reason: reason.into(),
            resume_target: resume_target.into(),
        }
    }
}
