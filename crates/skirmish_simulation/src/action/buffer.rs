//! Single-slot, time-bounded buffer for an action requested slightly too
//! early to start.
//!
//! A press during the tail of an unchainable window is remembered here and
//! fired the instant it becomes legal instead of being dropped. Latest input
//! wins: a new `buffer` call overwrites whatever was stored.

use crate::action::library::ActionHandle;

/// How long a buffered request stays consumable (seconds).
pub const DEFAULT_BUFFER_DURATION: f64 = 0.25;

#[derive(Debug, Clone)]
struct BufferedRequest {
    action: ActionHandle,
    time_requested: f64,
}

#[derive(Debug, Clone)]
pub struct ActionBuffer {
    slot: Option<BufferedRequest>,
    buffer_duration: f64,
}

impl Default for ActionBuffer {
    fn default() -> Self {
        Self {
            slot: None,
            buffer_duration: DEFAULT_BUFFER_DURATION,
        }
    }
}

impl ActionBuffer {
    /// Records `(action, now)`, discarding any previous entry.
    pub fn buffer(&mut self, action: ActionHandle, now: f64) {
        self.slot = Some(BufferedRequest {
            action,
            time_requested: now,
        });
    }

    /// Non-destructive look at the buffered action. An expired entry is
    /// cleared and reported as absent.
    pub fn peek_valid(&mut self, now: f64) -> Option<&ActionHandle> {
        if let Some(buffered) = &self.slot {
            if now - buffered.time_requested > self.buffer_duration {
                self.slot = None;
            }
        }
        self.slot.as_ref().map(|buffered| &buffered.action)
    }

    /// Destructive read: at most one consumer ever observes a buffered
    /// action, and only once. Expired entries are cleared and yield `None`.
    pub fn consume_if_valid(&mut self, now: f64) -> Option<ActionHandle> {
        let buffered = self.slot.take()?;

        if now - buffered.time_requested > self.buffer_duration {
            return None;
        }

        Some(buffered.action)
    }

    pub fn has_buffered_action(&self) -> bool {
        self.slot.is_some()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
