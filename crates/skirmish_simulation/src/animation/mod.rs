//! Animation playback adapter.
//!
//! `AnimationPlayback` is a pure playback executor: it advances clip time
//! and answers "how far along is the current clip", nothing else. All
//! authoritative combat state lives in the action controller, which queries
//! normalized time from here every tick. Keeping playback free of game
//! logic is what prevents the controller's notion of "current action" from
//! drifting away from what is visually playing.
//!
//! Normalized time is reported in [0, 1) and wraps on loop, matching an
//! animator's looped state query; actions finish at `end_at < 1.0` so the
//! controller acts before the wrap.

use bevy::prelude::*;

use crate::action::library::ActionHandle;

/// Clip currently being played for an actor.
#[derive(Debug, Clone)]
pub struct ActiveClip {
    pub state_name: String,
    pub selector_id: u32,
    pub length_secs: f32,
    pub root_motion: bool,
    elapsed_secs: f32,
}

/// Per-actor playback executor. Commanded by the action controller
/// (`play`/`end`), advanced once per tick at the head of the schedule.
#[derive(Component, Debug, Clone, Default)]
pub struct AnimationPlayback {
    active: Option<ActiveClip>,
}

/// Selector id reported while no action clip is active (locomotion loop).
pub const LOCOMOTION_SELECTOR: u32 = 0;

impl AnimationPlayback {
    /// Switches playback to the action's clip, restarting from the
    /// beginning and applying its root-motion flag. Always takes effect
    /// immediately: the next normalized-time query reflects the new clip.
    pub fn play(&mut self, action: &ActionHandle) {
        self.active = Some(ActiveClip {
            state_name: action.animation.state_name.clone(),
            selector_id: action.animation.selector_id,
            length_secs: action.animation.length_secs,
            root_motion: action.animation.root_motion,
            elapsed_secs: 0.0,
        });
    }

    /// Drops the action clip and falls back to the locomotion loop.
    pub fn end(&mut self) {
        self.active = None;
    }

    /// Progress of the current clip in [0, 1), wrapped on loop.
    /// 0.0 while no action clip is active.
    pub fn normalized_time(&self) -> f32 {
        match &self.active {
            Some(clip) => (clip.elapsed_secs / clip.length_secs).fract(),
            None => 0.0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn active_clip(&self) -> Option<&ActiveClip> {
        self.active.as_ref()
    }

    pub fn advance(&mut self, delta_secs: f32) {
        if let Some(clip) = &mut self.active {
            clip.elapsed_secs += delta_secs;
        }
    }
}

/// System: advance every actor's playback by the fixed tick.
///
/// Runs before the controllers are driven so the time they read is the
/// current tick's, not the previous one's.
pub fn advance_animation_playback(
    mut playbacks: Query<&mut AnimationPlayback>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    for mut playback in playbacks.iter_mut() {
        playback.advance(delta);
    }
}
