//! Shared store of validated action definitions.
//!
//! Definitions are authored once, validated in [`ActionLibrary::new`], and
//! handed out as [`ActionHandle`]s (`Arc`): read-only and safely shared by
//! every actor of the archetype. Nothing in the simulation runs with an
//! unvalidated definition.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::action::definition::{
    ActionDefinition, ActionId, ActionKind, ActionPriority, AnimationClip, DefinitionError,
    HitWindow, TimeWindow,
};

/// Shared, immutable reference to an authored action.
pub type ActionHandle = Arc<ActionDefinition>;

/// Ids of the default character action set.
pub mod actions {
    use crate::action::definition::ActionId;

    pub const LIGHT_ATTACK_1: ActionId = ActionId(1);
    pub const LIGHT_ATTACK_2: ActionId = ActionId(2);
    pub const LIGHT_ATTACK_3: ActionId = ActionId(3);
    pub const HEAVY_ATTACK: ActionId = ActionId(4);
    pub const JUMP_SLAM: ActionId = ActionId(5);
    pub const DODGE_ROLL: ActionId = ActionId(6);
    pub const HIT_REACTION: ActionId = ActionId(7);
    pub const KNOCKDOWN: ActionId = ActionId(8);
    pub const DEATH: ActionId = ActionId(9);
}

/// Id -> handle map for every action available to some archetype.
#[derive(Resource, Debug, Clone)]
pub struct ActionLibrary {
    actions: HashMap<ActionId, ActionHandle>,
}

impl ActionLibrary {
    /// Validates each definition, rejects duplicate ids, and resolves every
    /// chain target. Returns the first error found; callers must not
    /// continue with a partially valid set.
    pub fn new(definitions: Vec<ActionDefinition>) -> Result<Self, DefinitionError> {
        let mut actions: HashMap<ActionId, ActionHandle> = HashMap::new();

        for def in definitions {
            def.validate()?;
            if let Some(existing) = actions.get(&def.id) {
                return Err(DefinitionError::DuplicateId {
                    id: def.id,
                    first: existing.name.clone(),
                    second: def.name,
                });
            }
            actions.insert(def.id, Arc::new(def));
        }

        for handle in actions.values() {
            for target in &handle.chainable {
                if !actions.contains_key(target) {
                    return Err(DefinitionError::UnresolvedChainTarget {
                        action: handle.name.clone(),
                        target: *target,
                    });
                }
            }
        }

        Ok(Self { actions })
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionHandle> {
        self.actions.get(&id)
    }

    pub fn handle(&self, id: ActionId) -> Option<ActionHandle> {
        self.actions.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Default melee character set: three-hit light combo, heavy attack,
    /// jump slam, dodge roll, and the three reaction actions.
    pub fn character_default() -> Result<Self, DefinitionError> {
        use actions::*;

        Self::new(vec![
            attack(
                LIGHT_ATTACK_1,
                ActionKind::LightAttack,
                "light_attack_1",
                clip("SwingHandR_1", 1, 1.0),
                vec![LIGHT_ATTACK_2, HEAVY_ATTACK],
                vec![HitWindow { start: 0.35, end: 0.55, damage: 10, knockback: 2.0 }],
                10.0,
                None,
            ),
            attack(
                LIGHT_ATTACK_2,
                ActionKind::LightAttack,
                "light_attack_2",
                clip("SwingHandR_2", 2, 0.9),
                vec![LIGHT_ATTACK_3, HEAVY_ATTACK],
                vec![HitWindow { start: 0.30, end: 0.50, damage: 12, knockback: 2.0 }],
                10.0,
                None,
            ),
            attack(
                LIGHT_ATTACK_3,
                ActionKind::LightAttack,
                "light_attack_3",
                clip("SwingHandR_3", 3, 1.1),
                vec![],
                vec![HitWindow { start: 0.40, end: 0.60, damage: 18, knockback: 4.0 }],
                12.0,
                Some(TimeWindow::new(0.2, 0.5)),
            ),
            ActionDefinition {
                id: HEAVY_ATTACK,
                kind: ActionKind::HeavyAttack,
                name: "heavy_attack".to_string(),
                animation: clip("SwingHeavy", 4, 1.4),
                can_chain_from: 0.75,
                can_cancel_from: 0.5,
                end_at: 0.95,
                stamina_cost: 25.0,
                chainable: vec![LIGHT_ATTACK_1],
                priority: ActionPriority::Attack,
                uninterruptible: false,
                min_priority_to_interrupt: ActionPriority::HitReaction,
                hyper_armor: Some(TimeWindow::new(0.2, 0.7)),
                i_frames: None,
                hit_windows: vec![HitWindow { start: 0.45, end: 0.65, damage: 25, knockback: 6.0 }],
            },
            ActionDefinition {
                id: JUMP_SLAM,
                kind: ActionKind::JumpAttack,
                name: "jump_slam".to_string(),
                animation: AnimationClip {
                    state_name: "Attack_JumpVerticalSlam".to_string(),
                    selector_id: 5,
                    length_secs: 1.6,
                    root_motion: true,
                    full_body: true,
                },
                can_chain_from: 0.85,
                can_cancel_from: 0.8,
                end_at: 0.95,
                stamina_cost: 30.0,
                chainable: vec![],
                priority: ActionPriority::Attack,
                uninterruptible: false,
                min_priority_to_interrupt: ActionPriority::HitReaction,
                hyper_armor: Some(TimeWindow::new(0.1, 0.8)),
                i_frames: None,
                // Leap impact, then a weaker shockwave follow-up: the second
                // window re-arms hit gating so a target can be struck again.
                hit_windows: vec![
                    HitWindow { start: 0.35, end: 0.45, damage: 15, knockback: 5.0 },
                    HitWindow { start: 0.60, end: 0.70, damage: 10, knockback: 3.0 },
                ],
            },
            ActionDefinition {
                id: DODGE_ROLL,
                kind: ActionKind::Dodge,
                name: "dodge_roll".to_string(),
                animation: clip("DodgeRoll", 6, 0.8),
                can_chain_from: 0.6,
                can_cancel_from: 0.5,
                end_at: 0.95,
                stamina_cost: 15.0,
                chainable: vec![LIGHT_ATTACK_1],
                priority: ActionPriority::Dodge,
                uninterruptible: false,
                min_priority_to_interrupt: ActionPriority::HitReaction,
                hyper_armor: None,
                i_frames: Some(TimeWindow::new(0.1, 0.6)),
                hit_windows: vec![],
            },
            ActionDefinition {
                id: HIT_REACTION,
                kind: ActionKind::HitReaction,
                name: "hit_reaction".to_string(),
                animation: clip("HitReaction_Front", 7, 0.6),
                can_chain_from: 0.7,
                can_cancel_from: 0.6,
                end_at: 0.9,
                stamina_cost: 0.0,
                chainable: vec![],
                priority: ActionPriority::HitReaction,
                uninterruptible: false,
                // Another hit can re-stagger, a knockdown can floor us
                min_priority_to_interrupt: ActionPriority::HitReaction,
                hyper_armor: None,
                i_frames: None,
                hit_windows: vec![],
            },
            ActionDefinition {
                id: KNOCKDOWN,
                kind: ActionKind::Knockdown,
                name: "knockdown".to_string(),
                animation: clip("KnockBack_Backward", 8, 1.8),
                can_chain_from: 0.9,
                can_cancel_from: 0.85,
                end_at: 0.98,
                stamina_cost: 0.0,
                chainable: vec![],
                priority: ActionPriority::Knockdown,
                uninterruptible: false,
                // Only death overrides a knockdown in progress
                min_priority_to_interrupt: ActionPriority::Death,
                hyper_armor: None,
                // Brief invulnerability while getting up
                i_frames: Some(TimeWindow::new(0.7, 0.98)),
                hit_windows: vec![],
            },
            ActionDefinition {
                id: DEATH,
                kind: ActionKind::Death,
                name: "death".to_string(),
                animation: clip("Death", 9, 2.0),
                can_chain_from: 1.0,
                can_cancel_from: 1.0,
                // Normalized time wraps below 1.0, so death never finishes:
                // it is the terminal state and uninterruptible besides.
                end_at: 1.0,
                stamina_cost: 0.0,
                chainable: vec![],
                priority: ActionPriority::Death,
                uninterruptible: true,
                min_priority_to_interrupt: ActionPriority::Death,
                hyper_armor: None,
                i_frames: None,
                hit_windows: vec![],
            },
        ])
    }
}

fn clip(state_name: &str, selector_id: u32, length_secs: f32) -> AnimationClip {
    AnimationClip {
        state_name: state_name.to_string(),
        selector_id,
        length_secs,
        root_motion: false,
        full_body: true,
    }
}

#[allow(clippy::too_many_arguments)]
fn attack(
    id: ActionId,
    kind: ActionKind,
    name: &str,
    animation: AnimationClip,
    chainable: Vec<ActionId>,
    hit_windows: Vec<HitWindow>,
    stamina_cost: f32,
    hyper_armor: Option<TimeWindow>,
) -> ActionDefinition {
    ActionDefinition {
        id,
        kind,
        name: name.to_string(),
        animation,
        can_chain_from: 0.6,
        can_cancel_from: 0.3,
        end_at: 0.95,
        stamina_cost,
        chainable,
        priority: ActionPriority::Attack,
        uninterruptible: false,
        min_priority_to_interrupt: ActionPriority::HitReaction,
        hyper_armor,
        i_frames: None,
        hit_windows,
    }
}
