//! Authored action data: identity, animation linkage, timing thresholds,
//! interruption rules and hit windows.
//!
//! An `ActionDefinition` is written once at authoring time, validated, and
//! then shared read-only between every actor of the archetype. All timing
//! fields are normalized playback progress in [0, 1].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable id of an authored action. Chain lists reference actions by id;
/// the library resolves them at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u32);

/// Broad category of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    LightAttack,
    HeavyAttack,
    JumpAttack,
    Dodge,
    HitReaction,
    Knockdown,
    Death,
}

/// Interrupt priority, totally ordered.
///
/// Discriminants are explicit: interrupt checks compare these as numbers,
/// and the ordering must survive any future reordering of the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionPriority {
    Locomotion = 0,
    Attack = 1,
    Dodge = 2,
    HitReaction = 3,
    Knockdown = 4,
    Death = 5,
}

/// Animation clip backing an action.
///
/// The playback layer needs the clip length to report normalized time;
/// everything else is routing data for the animator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Semantic animator state name
    pub state_name: String,
    /// Numeric selector the animator layer switches on
    pub selector_id: u32,
    /// Clip length in seconds (must be positive)
    pub length_secs: f32,
    /// Root motion is driven by the animation while this action plays
    pub root_motion: bool,
    /// Occupies the full body (false = sub-layer, e.g. upper body only)
    pub full_body: bool,
}

/// Inclusive normalized-time interval.
///
/// Used for hyper armor and i-frames. "No window" is represented by
/// `Option<TimeWindow>::None`, never by a zero-width window at t=0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: f32,
    pub to: f32,
}

impl TimeWindow {
    pub fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, t: f32) -> bool {
        t >= self.from && t <= self.to
    }
}

/// Normalized interval during which the weapon hitbox is live, with the
/// payload delivered on contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitWindow {
    pub start: f32,
    pub end: f32,
    pub damage: u32,
    pub knockback: f32,
}

/// Immutable description of one action.
///
/// Timing convention: `can_cancel_from <= can_chain_from <= end_at`.
/// `uninterruptible` overrides the hyper armor window entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    // Identity
    pub id: ActionId,
    pub kind: ActionKind,
    pub name: String,

    // Animation linkage
    pub animation: AnimationClip,

    // Timing thresholds (normalized)
    /// Earliest time a follow-up combo action may start
    pub can_chain_from: f32,
    /// Earliest time the action unlocks (becomes cancellable)
    pub can_cancel_from: f32,
    /// Time at which the action finishes and control returns to idle
    pub end_at: f32,

    // Stamina
    pub stamina_cost: f32,

    // Combo continuations
    pub chainable: Vec<ActionId>,

    // Priority / interruption rules
    pub priority: ActionPriority,
    pub uninterruptible: bool,
    /// Minimum priority an incoming action needs to force-interrupt this one
    pub min_priority_to_interrupt: ActionPriority,
    pub hyper_armor: Option<TimeWindow>,

    // Invulnerability
    pub i_frames: Option<TimeWindow>,

    // Weapon activation
    pub hit_windows: Vec<HitWindow>,
}

/// Authoring-time validation failure. Fatal: nothing runs with an invalid
/// definition.
#[derive(Debug, Error, PartialEq)]
pub enum DefinitionError {
    #[error("action '{action}': field '{field}' = {value} is outside [0, 1]")]
    OutOfRange {
        action: String,
        field: &'static str,
        value: f32,
    },

    #[error("action '{action}': timing thresholds must satisfy can_cancel_from <= can_chain_from <= end_at")]
    ThresholdOrder { action: String },

    #[error("action '{action}': interval '{field}' is inverted (from > to)")]
    InvertedInterval {
        action: String,
        field: &'static str,
    },

    #[error("action '{action}': animation clip has empty state name")]
    EmptyAnimationName { action: String },

    #[error("action '{action}': animation clip length {length} must be positive")]
    NonPositiveClipLength { action: String, length: f32 },

    #[error("action '{action}': chain target {target:?} is not in the library")]
    UnresolvedChainTarget { action: String, target: ActionId },

    #[error("duplicate action id {id:?} ('{first}' and '{second}')")]
    DuplicateId {
        id: ActionId,
        first: String,
        second: String,
    },
}

impl ActionDefinition {
    /// Checks every range/ordering invariant of the authored data.
    /// Chain-target resolution is the library's job.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.animation.state_name.is_empty() {
            return Err(DefinitionError::EmptyAnimationName {
                action: self.name.clone(),
            });
        }
        if self.animation.length_secs <= 0.0 {
            return Err(DefinitionError::NonPositiveClipLength {
                action: self.name.clone(),
                length: self.animation.length_secs,
            });
        }

        self.check_normalized("can_chain_from", self.can_chain_from)?;
        self.check_normalized("can_cancel_from", self.can_cancel_from)?;
        self.check_normalized("end_at", self.end_at)?;

        if !(self.can_cancel_from <= self.can_chain_from && self.can_chain_from <= self.end_at) {
            return Err(DefinitionError::ThresholdOrder {
                action: self.name.clone(),
            });
        }

        if let Some(window) = &self.hyper_armor {
            self.check_window("hyper_armor", window)?;
        }
        if let Some(window) = &self.i_frames {
            self.check_window("i_frames", window)?;
        }

        for window in &self.hit_windows {
            self.check_normalized("hit_window.start", window.start)?;
            self.check_normalized("hit_window.end", window.end)?;
            if window.start > window.end {
                return Err(DefinitionError::InvertedInterval {
                    action: self.name.clone(),
                    field: "hit_window",
                });
            }
        }

        Ok(())
    }

    fn check_normalized(&self, field: &'static str, value: f32) -> Result<(), DefinitionError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(DefinitionError::OutOfRange {
                action: self.name.clone(),
                field,
                value,
            });
        }
        Ok(())
    }

    fn check_window(&self, field: &'static str, window: &TimeWindow) -> Result<(), DefinitionError> {
        self.check_normalized(field, window.from)?;
        self.check_normalized(field, window.to)?;
        if window.from > window.to {
            return Err(DefinitionError::InvertedInterval {
                action: self.name.clone(),
                field,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_def(name: &str) -> ActionDefinition {
        ActionDefinition {
            id: ActionId(1),
            kind: ActionKind::LightAttack,
            name: name.to_string(),
            animation: AnimationClip {
                state_name: "attack".to_string(),
                selector_id: 1,
                length_secs: 1.0,
                root_motion: false,
                full_body: true,
            },
            can_chain_from: 0.6,
            can_cancel_from: 0.3,
            end_at: 0.95,
            stamina_cost: 10.0,
            chainable: vec![],
            priority: ActionPriority::Attack,
            uninterruptible: false,
            min_priority_to_interrupt: ActionPriority::HitReaction,
            hyper_armor: None,
            i_frames: None,
            hit_windows: vec![],
        }
    }

    #[test]
    fn test_priority_ordering_is_total() {
        assert!(ActionPriority::Locomotion < ActionPriority::Attack);
        assert!(ActionPriority::Attack < ActionPriority::Dodge);
        assert!(ActionPriority::Dodge < ActionPriority::HitReaction);
        assert!(ActionPriority::HitReaction < ActionPriority::Knockdown);
        assert!(ActionPriority::Knockdown < ActionPriority::Death);
        assert!(ActionPriority::Knockdown >= ActionPriority::HitReaction);
    }

    #[test]
    fn test_valid_definition_passes() {
        assert_eq!(minimal_def("ok").validate(), Ok(()));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut def = minimal_def("bad_range");
        def.end_at = 1.2;
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::OutOfRange { field: "end_at", .. })
        ));
    }

    #[test]
    fn test_threshold_order_rejected() {
        let mut def = minimal_def("bad_order");
        def.can_cancel_from = 0.7;
        def.can_chain_from = 0.5;
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::ThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_inverted_iframe_window_rejected() {
        let mut def = minimal_def("bad_iframes");
        def.i_frames = Some(TimeWindow::new(0.6, 0.2));
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::InvertedInterval { field: "i_frames", .. })
        ));
    }

    #[test]
    fn test_inverted_hit_window_rejected() {
        let mut def = minimal_def("bad_window");
        def.hit_windows = vec![HitWindow {
            start: 0.5,
            end: 0.3,
            damage: 10,
            knockback: 1.0,
        }];
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::InvertedInterval { field: "hit_window", .. })
        ));
    }

    #[test]
    fn test_zero_length_clip_rejected() {
        let mut def = minimal_def("bad_clip");
        def.animation.length_secs = 0.0;
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::NonPositiveClipLength { .. })
        ));
    }

    #[test]
    fn test_time_window_contains_is_inclusive() {
        let window = TimeWindow::new(0.2, 0.4);
        assert!(window.contains(0.2));
        assert!(window.contains(0.4));
        assert!(window.contains(0.3));
        assert!(!window.contains(0.19));
        assert!(!window.contains(0.41));
    }
}
