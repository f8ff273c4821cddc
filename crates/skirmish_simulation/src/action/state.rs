//! Per-actor tracking of the running action and its normalized progress.

use crate::action::library::ActionHandle;

/// Mutable state of the one action an actor is currently performing.
///
/// Progress is never computed here: `tick` receives the normalized time the
/// playback layer reports, so logical state can not drift from the visuals.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    current: Option<ActionHandle>,
    normalized_time: f32,
    locked: bool,
}

impl ActionState {
    /// Enters `action`: progress resets to 0 and the state locks.
    pub fn start(&mut self, action: ActionHandle) {
        self.current = Some(action);
        self.normalized_time = 0.0;
        self.locked = true;
    }

    /// Leaves the acting state entirely (natural finish or interrupt).
    pub fn clear(&mut self) {
        self.current = None;
        self.normalized_time = 0.0;
        self.locked = false;
    }

    pub fn current(&self) -> Option<&ActionHandle> {
        self.current.as_ref()
    }

    pub fn normalized_time(&self) -> f32 {
        self.normalized_time
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Advances progress to the playback-reported time. The lock clears at
    /// `can_cancel_from` and, once cleared, is only re-set by a new `start`.
    ///
    /// Panics if no action is running: the controller never ticks while
    /// idle, so an idle tick is a state-machine desync.
    pub fn tick(&mut self, normalized_anim_time: f32) {
        let action = self.current_action();
        self.normalized_time = normalized_anim_time;

        if self.normalized_time >= action.can_cancel_from {
            self.locked = false;
        }
    }

    /// True iff the chain window is open and `next` is a listed
    /// continuation of the running action.
    pub fn can_chain(&self, next: &ActionHandle) -> bool {
        let action = self.current_action();

        if self.normalized_time < action.can_chain_from {
            return false;
        }

        action.chainable.contains(&next.id)
    }

    pub fn is_finished(&self) -> bool {
        self.normalized_time >= self.current_action().end_at
    }

    fn current_action(&self) -> ActionHandle {
        self.current
            .clone()
            .expect("action state queried while idle (controller desync)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::library::{actions, ActionLibrary};

    fn library() -> ActionLibrary {
        ActionLibrary::character_default().unwrap()
    }

    #[test]
    fn test_start_resets_progress_and_locks() {
        let library = library();
        let mut state = ActionState::default();

        state.start(library.handle(actions::LIGHT_ATTACK_1).unwrap());
        assert_eq!(state.normalized_time(), 0.0);
        assert!(state.is_locked());
        assert!(!state.is_finished());
    }

    #[test]
    fn test_lock_clears_at_cancel_threshold_and_stays_clear() {
        let library = library();
        let mut state = ActionState::default();
        state.start(library.handle(actions::LIGHT_ATTACK_1).unwrap());

        state.tick(0.2);
        assert!(state.is_locked());

        // can_cancel_from = 0.3
        state.tick(0.3);
        assert!(!state.is_locked());

        // Never re-locks without a new start, even on a wrapped time
        state.tick(0.1);
        assert!(!state.is_locked());

        state.start(library.handle(actions::LIGHT_ATTACK_2).unwrap());
        assert!(state.is_locked());
    }

    #[test]
    fn test_can_chain_needs_open_window_and_listed_target() {
        let library = library();
        let mut state = ActionState::default();
        state.start(library.handle(actions::LIGHT_ATTACK_1).unwrap());

        let follow_up = library.handle(actions::LIGHT_ATTACK_2).unwrap();
        let dodge = library.handle(actions::DODGE_ROLL).unwrap();

        // can_chain_from = 0.6
        state.tick(0.5);
        assert!(!state.can_chain(&follow_up));

        state.tick(0.65);
        assert!(state.can_chain(&follow_up));
        assert!(!state.can_chain(&dodge));
    }

    #[test]
    fn test_is_finished_at_end_threshold() {
        let library = library();
        let mut state = ActionState::default();
        state.start(library.handle(actions::LIGHT_ATTACK_1).unwrap());

        state.tick(0.94);
        assert!(!state.is_finished());

        // end_at = 0.95
        state.tick(0.95);
        assert!(state.is_finished());
    }

    #[test]
    #[should_panic(expected = "queried while idle")]
    fn test_tick_while_idle_panics() {
        let mut state = ActionState::default();
        state.tick(0.5);
    }
}
