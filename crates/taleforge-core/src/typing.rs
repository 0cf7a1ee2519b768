//! Typing player.
//!
//! Reveals one message at a fixed cadence, character by character, and
//! reports completion exactly once. The player never owns a timer: the caller
//! passes a monotonic timestamp (time since the view started) to
//! [`TypingPlayer::advance`]. After completion, whether natural or forced by
//! [`TypingPlayer::skip`], every further call is a no-op returning
//! [`TypingStep::Idle`], which is what cancels the reveal.

use std::time::Duration;

use crate::Message;

/// Reveal timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingConfig {
    /// Time between two revealed characters.
    pub cadence: Duration,
    /// Time the full text stays up before completion is reported.
    pub linger: Duration,
}

impl TypingConfig {
    /// Default time between characters.
    pub const DEFAULT_CADENCE: Duration = Duration::from_millis(30);
    /// Default pause after the last character.
    pub const DEFAULT_LINGER: Duration = Duration::from_millis(500);

    /// Reveal everything at once and complete on the first advance.
    pub fn instant() -> Self {
        Self { cadence: Duration::ZERO, linger: Duration::ZERO }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self { cadence: Self::DEFAULT_CADENCE, linger: Self::DEFAULT_LINGER }
    }
}

/// Result of driving the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingStep {
    /// Still revealing or lingering on the full text.
    Revealing,
    /// Completed on this call. Returned at most once per player.
    Finished,
    /// Already completed earlier.
    Idle,
}

/// Position in a reveal sequence: the byte length of the last prefix yielded.
///
/// Holds no reference to the text, so an owner of the text can keep one next
/// to it. The text must not change between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RevealCursor {
    end: usize,
    finished: bool,
}

impl RevealCursor {
    /// Move to the next prefix of `text` and return its byte length. `None`
    /// once the full text has been yielded.
    fn step(&mut self, text: &str) -> Option<usize> {
        if self.finished {
            return None;
        }
        self.end = match text[self.end..].chars().next() {
            Some(ch) => self.end + ch.len_utf8(),
            None => text.len(),
        };
        self.finished = self.end == text.len();
        Some(self.end)
    }

    fn jump_to_end(&mut self, text: &str) {
        self.end = text.len();
        self.finished = true;
    }
}

/// Lazy sequence of growing prefixes of a text, ending with the full text.
///
/// Prefixes always end on a character boundary. An empty text yields a single
/// empty prefix. [`TypingPlayer`] walks the same sequence, one prefix per due
/// character.
#[derive(Debug, Clone)]
pub struct Reveal<'a> {
    text: &'a str,
    cursor: RevealCursor,
}

impl<'a> Iterator for Reveal<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.cursor.step(self.text)?;
        Some(&self.text[..end])
    }
}

/// Prefixes of `text` in reveal order.
pub fn reveal(text: &str) -> Reveal<'_> {
    Reveal { text, cursor: RevealCursor::default() }
}

/// Progressive reveal of a single message.
#[derive(Debug, Clone)]
pub struct TypingPlayer {
    content: String,
    animated: bool,
    config: TypingConfig,
    started_at: Duration,
    total_chars: usize,
    revealed_chars: usize,
    cursor: RevealCursor,
    done: bool,
}

impl TypingPlayer {
    /// Start revealing `message` at time `now`.
    ///
    /// Player messages are not animated: their first [`advance`] shows the
    /// full text and finishes.
    ///
    /// [`advance`]: TypingPlayer::advance
    pub fn start(message: &Message, config: TypingConfig, now: Duration) -> Self {
        let content = message.content().to_owned();
        let total_chars = content.chars().count();
        Self {
            content,
            animated: message.role().is_animated(),
            config,
            started_at: now,
            total_chars,
            revealed_chars: 0,
            cursor: RevealCursor::default(),
            done: false,
        }
    }

    /// Reveal whatever is due at `now`.
    pub fn advance(&mut self, now: Duration) -> TypingStep {
        if self.done {
            return TypingStep::Idle;
        }
        if !self.animated {
            return self.finish();
        }

        let elapsed = now.saturating_sub(self.started_at);
        self.reveal_to(self.due_chars(elapsed));
        if elapsed >= self.completes_after() {
            return self.finish();
        }
        TypingStep::Revealing
    }

    /// Show the full text and complete now.
    ///
    /// Returns [`TypingStep::Idle`] if completion already happened, so a skip
    /// racing a natural completion never completes twice.
    pub fn skip(&mut self) -> TypingStep {
        if self.done {
            return TypingStep::Idle;
        }
        self.finish()
    }

    /// Text revealed so far: the latest prefix of [`reveal`] this player
    /// stepped to.
    pub fn visible(&self) -> &str {
        &self.content[..self.cursor.end]
    }

    /// Full text being revealed.
    pub fn content(&self) -> &str {
        &self.content
    }

    fn finish(&mut self) -> TypingStep {
        self.revealed_chars = self.total_chars;
        self.cursor.jump_to_end(&self.content);
        self.done = true;
        TypingStep::Finished
    }

    fn due_chars(&self, elapsed: Duration) -> usize {
        let cadence = self.config.cadence.as_nanos();
        if cadence == 0 {
            return self.total_chars;
        }
        let due = elapsed.as_nanos() / cadence;
        usize::try_from(due).unwrap_or(usize::MAX).min(self.total_chars)
    }

    fn completes_after(&self) -> Duration {
        let chars = u32::try_from(self.total_chars).unwrap_or(u32::MAX);
        self.config.cadence.saturating_mul(chars).saturating_add(self.config.linger)
    }

    fn reveal_to(&mut self, chars: usize) {
        while self.revealed_chars < chars {
            if self.cursor.step(&self.content).is_none() {
                break;
            }
            self.revealed_chars += 1;
        }
    }
}
