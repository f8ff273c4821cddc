//! Behavior tree leaves for melee enemies.
//!
//! Leaves read a per-tick [`BrainContext`] snapshot and record decisions on
//! it (an action to request, a chase intent); the brain system turns those
//! into events. Leaves never touch the world directly.

use crate::action::ActionId;
use crate::ai::behavior_tree::{Behavior, NodeStatus};

/// Snapshot handed to the tree each AI tick.
#[derive(Debug, Clone)]
pub struct BrainContext {
    /// Distance to a live target, None if the target is gone or dead
    pub distance_to_target: Option<f32>,
    pub is_dead: bool,
    pub stamina: f32,
    /// Action currently playing on our own controller
    pub current_action: Option<ActionId>,
    pub normalized_time: f32,
    /// Pre-rolled random in [0, 1) from the seeded simulation RNG
    pub attack_roll: f32,

    // Decisions recorded by leaves
    pub requested: Option<ActionId>,
    pub chase: bool,
}

/// Condition: are we dead? Succeeding here parks the whole tree.
pub struct IsDead;

impl Behavior<BrainContext> for IsDead {
    fn tick(&mut self, ctx: &mut BrainContext) -> NodeStatus {
        if ctx.is_dead {
            NodeStatus::Success
        } else {
            NodeStatus::Failure
        }
    }
}

/// Condition: live target within `[min, max]` meters.
pub struct TargetInRange {
    pub min: f32,
    pub max: f32,
}

impl Behavior<BrainContext> for TargetInRange {
    fn tick(&mut self, ctx: &mut BrainContext) -> NodeStatus {
        match ctx.distance_to_target {
            Some(distance) if distance >= self.min && distance <= self.max => NodeStatus::Success,
            _ => NodeStatus::Failure,
        }
    }
}

/// Action: run a combo of attacks, queueing each follow-up late in the
/// current swing so it lands in the input buffer and chains the moment the
/// window opens.
///
/// Holds several authored sequences; the opener is picked by the tick's
/// random roll. A reaction interrupting the combo resets it.
pub struct ComboAttack {
    sequences: Vec<Vec<ActionId>>,
    /// Minimum stamina to commit to a new combo
    pub min_stamina: f32,
    /// (sequence, last requested stage) while a combo is in flight
    active: Option<(usize, usize)>,
}

/// Normalized progress after which the follow-up is requested (early
/// enough to buffer, late enough to read as a deliberate press).
const FOLLOW_UP_AT: f32 = 0.45;

impl ComboAttack {
    /// Panics if `sequences` is empty or any sequence is empty.
    pub fn new(sequences: Vec<Vec<ActionId>>, min_stamina: f32) -> Self {
        assert!(!sequences.is_empty(), "ComboAttack needs at least one sequence");
        assert!(
            sequences.iter().all(|s| !s.is_empty()),
            "ComboAttack sequences must not be empty"
        );
        Self {
            sequences,
            min_stamina,
            active: None,
        }
    }
}

impl Behavior<BrainContext> for ComboAttack {
    fn tick(&mut self, ctx: &mut BrainContext) -> NodeStatus {
        match ctx.current_action {
            None => {
                if ctx.stamina < self.min_stamina {
                    self.active = None;
                    return NodeStatus::Failure;
                }
                let pick =
                    ((ctx.attack_roll * self.sequences.len() as f32) as usize)
                        .min(self.sequences.len() - 1);
                ctx.requested = Some(self.sequences[pick][0]);
                self.active = Some((pick, 0));
                NodeStatus::Running
            }
            Some(current) => {
                let Some((sequence, stage)) = self.active else {
                    // Someone else's action (a reaction, a dodge) is playing
                    return NodeStatus::Failure;
                };
                let combo = &self.sequences[sequence];

                if current == combo[stage] {
                    // The requested swing is playing; queue the follow-up
                    // once the swing is far enough along
                    if stage + 1 < combo.len()
                        && ctx.normalized_time >= FOLLOW_UP_AT
                        && ctx.requested.is_none()
                    {
                        ctx.requested = Some(combo[stage + 1]);
                        self.active = Some((sequence, stage + 1));
                    }
                    NodeStatus::Running
                } else if stage > 0 && current == combo[stage - 1] {
                    // Previous swing still finishing, follow-up is buffered
                    NodeStatus::Running
                } else {
                    // Interrupted mid-combo; the chain is gone for good
                    self.active = None;
                    NodeStatus::Failure
                }
            }
        }
    }
}

/// Action: close the distance to the target.
pub struct Chase;

impl Behavior<BrainContext> for Chase {
    fn tick(&mut self, ctx: &mut BrainContext) -> NodeStatus {
        ctx.chase = true;
        NodeStatus::Running
    }
}

/// Fallback: stand around.
pub struct Idle;

impl Behavior<BrainContext> for Idle {
    fn tick(&mut self, _ctx: &mut BrainContext) -> NodeStatus {
        NodeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::actions;

    fn ctx() -> BrainContext {
        BrainContext {
            distance_to_target: Some(1.0),
            is_dead: false,
            stamina: 100.0,
            current_action: None,
            normalized_time: 0.0,
            attack_roll: 0.0,
            requested: None,
            chase: false,
        }
    }

    #[test]
    fn test_range_check_bounds_inclusive() {
        let mut node = TargetInRange { min: 0.0, max: 2.0 };

        let mut context = ctx();
        context.distance_to_target = Some(2.0);
        assert_eq!(node.tick(&mut context), NodeStatus::Success);

        context.distance_to_target = Some(2.1);
        assert_eq!(node.tick(&mut context), NodeStatus::Failure);

        context.distance_to_target = None;
        assert_eq!(node.tick(&mut context), NodeStatus::Failure);
    }

    #[test]
    fn test_combo_opens_then_queues_follow_up() {
        let mut node = ComboAttack::new(
            vec![vec![actions::LIGHT_ATTACK_1, actions::LIGHT_ATTACK_2]],
            20.0,
        );

        // Idle: opener requested
        let mut context = ctx();
        assert_eq!(node.tick(&mut context), NodeStatus::Running);
        assert_eq!(context.requested, Some(actions::LIGHT_ATTACK_1));

        // Opener playing, early in the swing: nothing new requested
        let mut context = ctx();
        context.current_action = Some(actions::LIGHT_ATTACK_1);
        context.normalized_time = 0.2;
        assert_eq!(node.tick(&mut context), NodeStatus::Running);
        assert_eq!(context.requested, None);

        // Late in the swing: follow-up queued exactly once
        let mut context = ctx();
        context.current_action = Some(actions::LIGHT_ATTACK_1);
        context.normalized_time = 0.5;
        assert_eq!(node.tick(&mut context), NodeStatus::Running);
        assert_eq!(context.requested, Some(actions::LIGHT_ATTACK_2));

        // Still on the first swing while the follow-up is buffered
        let mut context = ctx();
        context.current_action = Some(actions::LIGHT_ATTACK_1);
        context.normalized_time = 0.55;
        assert_eq!(node.tick(&mut context), NodeStatus::Running);
        assert_eq!(context.requested, None);
    }

    #[test]
    fn test_combo_fails_without_stamina() {
        let mut node = ComboAttack::new(vec![vec![actions::LIGHT_ATTACK_1]], 20.0);

        let mut context = ctx();
        context.stamina = 10.0;
        assert_eq!(node.tick(&mut context), NodeStatus::Failure);
        assert_eq!(context.requested, None);
    }

    #[test]
    fn test_combo_resets_when_interrupted() {
        let mut node = ComboAttack::new(
            vec![vec![actions::LIGHT_ATTACK_1, actions::LIGHT_ATTACK_2]],
            20.0,
        );

        let mut context = ctx();
        node.tick(&mut context);

        // A hit reaction replaced our swing
        let mut context = ctx();
        context.current_action = Some(actions::HIT_REACTION);
        assert_eq!(node.tick(&mut context), NodeStatus::Failure);

        // Back to idle: combo starts over from the opener
        let mut context = ctx();
        assert_eq!(node.tick(&mut context), NodeStatus::Running);
        assert_eq!(context.requested, Some(actions::LIGHT_ATTACK_1));
    }

    #[test]
    fn test_combo_roll_picks_sequence() {
        let mut node = ComboAttack::new(
            vec![vec![actions::LIGHT_ATTACK_1], vec![actions::HEAVY_ATTACK]],
            0.0,
        );

        let mut context = ctx();
        context.attack_roll = 0.9;
        node.tick(&mut context);
        assert_eq!(context.requested, Some(actions::HEAVY_ATTACK));
    }
}
