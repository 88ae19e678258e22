//! Typewriter animation for the composer's placeholder text.
//!
//! [`PlaceholderAnimator`] is the pure state machine: it types the current
//! phrase one character at a time, pauses, erases it faster, then moves to the
//! next phrase, forever. [`Placeholder`] drives it with one tokio timer at a
//! time. Every armed timer carries a generation number; re-arming or
//! unmounting aborts the outstanding timer, and a tick that still arrives with
//! an old generation is ignored, so no step ever runs against a replaced
//! snapshot.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::app_event::ComposerEvent;
use crate::app_event_sender::ComposerEventSender;
use crate::config::PlaceholderTiming;
use crate::error::ComposerError;

/// Text shown in front of the animated phrase.
pub const PLACEHOLDER_PREFIX: &str = "Create a ";

#[derive(Debug, Clone)]
pub struct PlaceholderAnimator {
    phrases: Vec<String>,
    timing: PlaceholderTiming,
    phrase_index: usize,
    /// Length of the visible prefix, in chars.
    visible_chars: usize,
    typing: bool,
}

impl PlaceholderAnimator {
    pub fn new(phrases: Vec<String>, timing: PlaceholderTiming) -> Result<Self, ComposerError> {
        if phrases.is_empty() {
            return Err(ComposerError::EmptyPlaceholderPhrases);
        }
        Ok(Self {
            phrases,
            timing,
            phrase_index: 0,
            visible_chars: 0,
            typing: true,
        })
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn current_phrase(&self) -> &str {
        &self.phrases[self.phrase_index]
    }

    /// The currently visible prefix of [`Self::current_phrase`].
    pub fn visible_text(&self) -> &str {
        prefix_chars(self.current_phrase(), self.visible_chars)
    }

    /// The full placeholder string to render, e.g. `Create a todo li`.
    pub fn prompt(&self) -> String {
        format!("{PLACEHOLDER_PREFIX}{}", self.visible_text())
    }

    /// How long to wait before the next [`Self::step`].
    pub fn next_delay(&self) -> Duration {
        let full = self.visible_chars >= self.phrase_chars();
        match (self.typing, full, self.visible_chars == 0) {
            (true, false, _) => self.timing.type_interval,
            (true, true, _) => self.timing.pause,
            (false, _, false) => self.timing.erase_interval,
            (false, _, true) => Duration::ZERO,
        }
    }

    /// Apply exactly one transition.
    pub fn step(&mut self) {
        if self.typing {
            if self.visible_chars < self.phrase_chars() {
                self.visible_chars += 1;
            } else {
                self.typing = false;
            }
        } else if self.visible_chars > 0 {
            self.visible_chars -= 1;
        } else {
            self.phrase_index = (self.phrase_index + 1) % self.phrases.len();
            self.typing = true;
        }
    }

    fn phrase_chars(&self) -> usize {
        self.current_phrase().chars().count()
    }
}

fn prefix_chars(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

struct PlaceholderTicker {
    pending: JoinHandle<()>,
}

impl PlaceholderTicker {
    fn arm(tx: ComposerEventSender, delay: Duration, generation: u64) -> Self {
        let pending = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send(ComposerEvent::PlaceholderTick { generation });
        });
        Self { pending }
    }
}

impl Drop for PlaceholderTicker {
    fn drop(&mut self) {
        self.pending.abort();
    }
}

/// A [`PlaceholderAnimator`] plus the timer that advances it while mounted.
pub struct Placeholder {
    animator: PlaceholderAnimator,
    tx: Option<ComposerEventSender>,
    ticker: Option<PlaceholderTicker>,
    generation: u64,
}

impl Placeholder {
    pub fn new(animator: PlaceholderAnimator) -> Self {
        Self {
            animator,
            tx: None,
            ticker: None,
            generation: 0,
        }
    }

    pub fn animator(&self) -> &PlaceholderAnimator {
        &self.animator
    }

    pub fn is_mounted(&self) -> bool {
        self.tx.is_some()
    }

    /// Start animating. Must be called from within a tokio runtime.
    pub fn mount(&mut self, tx: ComposerEventSender) {
        if self.is_mounted() {
            return;
        }
        self.tx = Some(tx);
        self.rearm();
    }

    /// Stop animating and cancel the outstanding timer.
    pub fn unmount(&mut self) {
        self.ticker = None;
        self.tx = None;
    }

    /// Apply a due tick. Returns whether the visible state changed.
    pub(crate) fn on_tick(&mut self, generation: u64) -> bool {
        if !self.is_mounted() || generation != self.generation {
            tracing::trace!(
                generation,
                current = self.generation,
                "ignoring stale placeholder tick"
            );
            return false;
        }
        self.animator.step();
        self.rearm();
        true
    }

    fn rearm(&mut self) {
        // Dropping the previous ticker aborts it before the new one exists.
        self.ticker = None;
        let Some(tx) = self.tx.clone() else {
            return;
        };
        self.generation = self.generation.wrapping_add(1);
        self.ticker = Some(PlaceholderTicker::arm(
            tx,
            self.animator.next_delay(),
            self.generation,
        ));
    }
}
