//! Action system: authored definitions, per-actor state machine, input
//! buffering and combo chaining.
//!
//! Request flow:
//!
//! ```text
//! AI leaf / input mapper / hit resolver → ActionRequested
//!   ↓
//! process_action_requests: start | force-interrupt | chain-start | buffer
//!   ↓
//! drive_action_controllers (every tick): advance progress from playback,
//! fire newly-legal buffered chains, finish at end_at
//!   ↓
//! ActionStarted / ActionInterrupted / ActionEnded (visual layer syncs on
//! these; hit windows read the controller directly)
//! ```

use bevy::prelude::*;

pub mod buffer;
pub mod controller;
pub mod definition;
pub mod library;
pub mod state;

pub use buffer::{ActionBuffer, DEFAULT_BUFFER_DURATION};
pub use controller::{
    drive_action_controllers, process_action_requests, ActionController, ActionDecision,
    ActionEnded, ActionInterrupted, ActionRequested, ActionStarted, DriveOutcome,
};
pub use definition::{
    ActionDefinition, ActionId, ActionKind, ActionPriority, AnimationClip, DefinitionError,
    HitWindow, TimeWindow,
};
pub use library::{actions, ActionHandle, ActionLibrary};
pub use state::ActionState;

use crate::animation::advance_animation_playback;
use crate::TickSet;

/// Registers the action state machine on the fixed tick.
///
/// Order inside [`TickSet::Actions`] is load-bearing: playback advances
/// first so controllers read this tick's time, requests are arbitrated
/// next, and the drive loop (buffer consumption before finish check) runs
/// last.
pub struct ActionPlugin;

impl Plugin for ActionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ActionRequested>()
            .add_event::<ActionStarted>()
            .add_event::<ActionInterrupted>()
            .add_event::<ActionEnded>();

        app.add_systems(
            FixedUpdate,
            (
                advance_animation_playback,
                process_action_requests,
                drive_action_controllers,
            )
                .chain()
                .in_set(TickSet::Actions),
        );
    }
}
