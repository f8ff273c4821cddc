//! The action state machine: request arbitration, combo chaining, input
//! buffering, interruption and the per-tick drive loop.
//!
//! Two states: Idle (no current action) and Acting. Everything finer
//! (locked, hyper armor, i-frames, chain window) is derived from the
//! running action's thresholds and the normalized time reported by the
//! playback adapter. The controller owns all combat-logic state; playback
//! is only ever commanded and queried.
//!
//! Tick ordering inside one `FixedUpdate` pass (the drive loop):
//! 1. advance progress from playback
//! 2. try to consume the buffered action (before the finish check, so a
//!    just-unlocked combo overrides a same-tick natural completion)
//! 3. finish check, transition to idle
//!
//! Hit-window evaluation runs after the controllers in the schedule.

use bevy::prelude::*;

use crate::action::buffer::ActionBuffer;
use crate::action::definition::ActionId;
use crate::action::library::{ActionHandle, ActionLibrary};
use crate::action::state::ActionState;
use crate::animation::AnimationPlayback;
use crate::components::Stamina;
use crate::logger;

// ============================================================================
// Component
// ============================================================================

/// Per-actor action state machine. Owns the actor's [`ActionState`] and
/// [`ActionBuffer`]; commands the actor's [`AnimationPlayback`].
#[derive(Component, Debug, Clone, Default)]
pub struct ActionController {
    state: ActionState,
    buffer: ActionBuffer,
}

/// What `request_action` decided to do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDecision {
    /// Started immediately (from idle, or as a legal chain continuation)
    Started,
    /// Force-interrupted the previous action and started fresh
    Interrupted { previous: ActionHandle },
    /// Remembered for later; overwrites any earlier buffered request
    Buffered,
}

/// What the per-tick drive loop did.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveOutcome {
    /// A buffered action became legal and started
    Chained(ActionHandle),
    /// The action reached `end_at` and the actor returned to idle
    Finished(ActionHandle),
}

impl ActionController {
    pub fn current_action(&self) -> Option<&ActionHandle> {
        self.state.current()
    }

    pub fn is_acting(&self) -> bool {
        self.state.current().is_some()
    }

    pub fn normalized_time(&self) -> f32 {
        self.state.normalized_time()
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    pub fn has_buffered_action(&self) -> bool {
        self.buffer.has_buffered_action()
    }

    /// True iff an action is running and progress is inside its i-frame
    /// window.
    pub fn is_invulnerable(&self) -> bool {
        let Some(action) = self.state.current() else {
            return false;
        };
        action
            .i_frames
            .is_some_and(|window| window.contains(self.state.normalized_time()))
    }

    /// True iff an action is running and progress is inside its hyper-armor
    /// window. Note: `uninterruptible` is checked separately and first.
    pub fn has_hyper_armor(&self) -> bool {
        let Some(action) = self.state.current() else {
            return false;
        };
        action
            .hyper_armor
            .is_some_and(|window| window.contains(self.state.normalized_time()))
    }

    /// Entry point for any external driver (input mapper, AI leaf, hit
    /// reaction resolver). Never fails: a request that can neither start
    /// nor interrupt is buffered and at worst expires unconsumed.
    pub fn request_action(
        &mut self,
        action: &ActionHandle,
        now: f64,
        playback: &mut AnimationPlayback,
    ) -> ActionDecision {
        if !self.is_acting() {
            self.start(action.clone(), playback);
            return ActionDecision::Started;
        }

        if self.can_interrupt(action) {
            let previous = self
                .state
                .current()
                .cloned()
                .expect("interrupt path requires a running action");
            self.force_interrupt(action.clone(), playback);
            return ActionDecision::Interrupted { previous };
        }

        if self.can_start(action) {
            self.start(action.clone(), playback);
            return ActionDecision::Started;
        }

        self.buffer.buffer(action.clone(), now);
        ActionDecision::Buffered
    }

    /// Per-tick drive: advance progress, fire a now-legal buffered chain,
    /// otherwise finish if past `end_at`. No-op while idle.
    pub fn update(
        &mut self,
        playback: &mut AnimationPlayback,
        now: f64,
    ) -> Option<DriveOutcome> {
        if !self.is_acting() {
            return None;
        }

        self.state.tick(playback.normalized_time());

        if let Some(chained) = self.try_consume_buffered(now, playback) {
            return Some(DriveOutcome::Chained(chained));
        }

        if self.state.is_finished() {
            let finished = self
                .state
                .current()
                .cloned()
                .expect("finish check requires a running action");
            self.end(playback);
            return Some(DriveOutcome::Finished(finished));
        }

        None
    }

    /// First matching rule wins:
    /// a. idle: always interruptible
    /// b. current flagged uninterruptible: never (overrides hyper armor)
    /// c. inside the hyper-armor window: no
    /// d. otherwise: incoming priority >= current's min_priority_to_interrupt
    fn can_interrupt(&self, incoming: &ActionHandle) -> bool {
        let Some(current) = self.state.current() else {
            return true;
        };

        if current.uninterruptible {
            return false;
        }

        if self.has_hyper_armor() {
            return false;
        }

        incoming.priority >= current.min_priority_to_interrupt
    }

    /// A request starts without interruption iff the current action is
    /// unlocked and lists the request as a chain continuation.
    fn can_start(&self, action: &ActionHandle) -> bool {
        if !self.is_acting() {
            return true;
        }
        !self.state.is_locked() && self.state.can_chain(action)
    }

    /// Buffered consumption is a peek-then-take: only an entry that is both
    /// still valid and already chainable is consumed. A valid entry whose
    /// chain window has not opened yet stays buffered for a later tick.
    fn try_consume_buffered(
        &mut self,
        now: f64,
        playback: &mut AnimationPlayback,
    ) -> Option<ActionHandle> {
        if self.state.is_locked() {
            return None;
        }

        let chainable = match self.buffer.peek_valid(now) {
            Some(buffered) => self.state.can_chain(buffered),
            None => return None,
        };
        if !chainable {
            return None;
        }

        let action = self
            .buffer
            .consume_if_valid(now)
            .expect("peeked entry must still be consumable at the same instant");
        self.start(action.clone(), playback);
        Some(action)
    }

    fn start(&mut self, action: ActionHandle, playback: &mut AnimationPlayback) {
        playback.play(&action);
        self.state.start(action);
    }

    fn end(&mut self, playback: &mut AnimationPlayback) {
        self.state.clear();
        playback.end();
    }

    /// Immediate and total: clears the current action, force-unlocks,
    /// discards any buffered request, then starts the new action fresh.
    /// An interrupted combo can never resume afterwards.
    fn force_interrupt(&mut self, action: ActionHandle, playback: &mut AnimationPlayback) {
        self.state.clear();
        self.buffer.clear();
        self.start(action, playback);
    }
}

// ============================================================================
// Events
// ============================================================================

/// Request an action on an actor. Written by AI leaves, the hit reaction
/// resolver, or whatever input mapper the embedder wires up.
#[derive(Event, Debug, Clone)]
pub struct ActionRequested {
    pub entity: Entity,
    pub action: ActionId,
}

/// An action began playing (fresh start, forced interrupt or combo chain).
/// The visual layer switches the actor's animation state on this.
#[derive(Event, Debug, Clone)]
pub struct ActionStarted {
    pub entity: Entity,
    pub action: ActionId,
}

/// An action was force-interrupted before finishing.
#[derive(Event, Debug, Clone)]
pub struct ActionInterrupted {
    pub entity: Entity,
    pub interrupted: ActionId,
    pub by: ActionId,
}

/// An action ran to `end_at` and the actor returned to idle.
#[derive(Event, Debug, Clone)]
pub struct ActionEnded {
    pub entity: Entity,
    pub action: ActionId,
}

// ============================================================================
// Systems
// ============================================================================

/// System: arbitrate incoming action requests.
///
/// Resolves the requested id against the library (unknown ids are logged
/// and skipped, not errors), runs the controller's decision procedure and
/// mirrors the outcome as events. Stamina is consumed on every actual
/// start; affordability gating is the requester's concern.
pub fn process_action_requests(
    mut requests: EventReader<ActionRequested>,
    mut actors: Query<(&mut ActionController, &mut AnimationPlayback, Option<&mut Stamina>)>,
    library: Res<ActionLibrary>,
    time: Res<Time<Fixed>>,
    mut started_events: EventWriter<ActionStarted>,
    mut interrupted_events: EventWriter<ActionInterrupted>,
) {
    let now = time.elapsed_secs_f64();

    for request in requests.read() {
        let Some(action) = library.handle(request.action) else {
            logger::log_warning(&format!(
                "Requested unknown action {:?} for {:?}",
                request.action, request.entity
            ));
            continue;
        };

        let Ok((mut controller, mut playback, stamina)) = actors.get_mut(request.entity) else {
            continue;
        };

        match controller.request_action(&action, now, &mut playback) {
            ActionDecision::Started => {
                consume_stamina(stamina, &action);
                started_events.write(ActionStarted {
                    entity: request.entity,
                    action: action.id,
                });
                logger::log(&format!(
                    "⚔️ Action '{}' started ({:?})",
                    action.name, request.entity
                ));
            }
            ActionDecision::Interrupted { previous } => {
                consume_stamina(stamina, &action);
                interrupted_events.write(ActionInterrupted {
                    entity: request.entity,
                    interrupted: previous.id,
                    by: action.id,
                });
                started_events.write(ActionStarted {
                    entity: request.entity,
                    action: action.id,
                });
                logger::log(&format!(
                    "💥 Action '{}' interrupted '{}' ({:?})",
                    action.name, previous.name, request.entity
                ));
            }
            ActionDecision::Buffered => {
                logger::log(&format!(
                    "⏰ Action '{}' buffered ({:?})",
                    action.name, request.entity
                ));
            }
        }
    }
}

/// System: drive every acting controller one tick forward.
///
/// Must run after `advance_animation_playback` (fresh normalized time) and
/// before hit-window evaluation (windows read this tick's progress).
pub fn drive_action_controllers(
    mut actors: Query<(
        Entity,
        &mut ActionController,
        &mut AnimationPlayback,
        Option<&mut Stamina>,
    )>,
    time: Res<Time<Fixed>>,
    mut started_events: EventWriter<ActionStarted>,
    mut ended_events: EventWriter<ActionEnded>,
) {
    let now = time.elapsed_secs_f64();

    for (entity, mut controller, mut playback, stamina) in actors.iter_mut() {
        match controller.update(&mut playback, now) {
            Some(DriveOutcome::Chained(action)) => {
                consume_stamina(stamina, &action);
                started_events.write(ActionStarted {
                    entity,
                    action: action.id,
                });
                logger::log(&format!(
                    "⚔️ Buffered '{}' chained ({:?})",
                    action.name, entity
                ));
            }
            Some(DriveOutcome::Finished(action)) => {
                ended_events.write(ActionEnded {
                    entity,
                    action: action.id,
                });
                logger::log(&format!(
                    "✅ Action '{}' finished ({:?})",
                    action.name, entity
                ));
            }
            None => {}
        }
    }
}

fn consume_stamina(stamina: Option<Mut<Stamina>>, action: &ActionHandle) {
    if let Some(mut stamina) = stamina {
        if action.stamina_cost > 0.0 {
            stamina.consume(action.stamina_cost);
        }
    }
}
