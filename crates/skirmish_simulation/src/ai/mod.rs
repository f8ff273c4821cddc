//! Enemy AI: a behavior tree per brain, issuing action requests into the
//! same controller surface the player input mapper uses.
//!
//! The tree never mutates the world. Each tick the brain system builds a
//! [`BrainContext`] snapshot (target distance, own action progress,
//! stamina, a random roll), evaluates the tree, and converts the recorded
//! decisions into `ActionRequested` events and a movement intent.

use bevy::prelude::*;
use rand::Rng;

pub mod behavior_tree;
pub mod nodes;

pub use behavior_tree::{Behavior, NodeStatus, Selector, Sequence};
pub use nodes::{BrainContext, Chase, ComboAttack, Idle, IsDead, TargetInRange};

use crate::action::{actions, ActionController, ActionRequested};
use crate::combat::Dead;
use crate::components::{Health, Stamina};
use crate::{DeterministicRng, TickSet};

// ============================================================================
// Components
// ============================================================================

/// Behavior-tree brain of one enemy.
#[derive(Component)]
pub struct EnemyBrain {
    root: Box<dyn Behavior<BrainContext>>,
    pub target: Option<Entity>,
}

impl EnemyBrain {
    pub fn new(root: Box<dyn Behavior<BrainContext>>, target: Option<Entity>) -> Self {
        Self { root, target }
    }

    /// Default melee brawler:
    /// dead-check, then attack in reach (random opener: light combo or
    /// heavy), then chase within detection range, else idle.
    pub fn melee_brawler(target: Entity) -> Self {
        let root = Selector::new(vec![
            Box::new(IsDead) as Box<dyn Behavior<BrainContext>>,
            Box::new(Sequence::new(vec![
                Box::new(TargetInRange { min: 0.0, max: 1.8 }) as Box<dyn Behavior<BrainContext>>,
                Box::new(ComboAttack::new(
                    vec![
                        vec![
                            actions::LIGHT_ATTACK_1,
                            actions::LIGHT_ATTACK_2,
                            actions::LIGHT_ATTACK_3,
                        ],
                        vec![actions::HEAVY_ATTACK],
                    ],
                    30.0,
                )),
            ])),
            Box::new(Sequence::new(vec![
                Box::new(TargetInRange { min: 0.0, max: 12.0 }) as Box<dyn Behavior<BrainContext>>,
                Box::new(Chase),
            ])),
            Box::new(Idle),
        ]);

        Self::new(Box::new(root), Some(target))
    }
}

/// Desired movement, applied only while the actor is free to move.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MoveIntent {
    pub direction: Vec3,
    pub speed: f32,
}

impl Default for MoveIntent {
    fn default() -> Self {
        Self {
            direction: Vec3::ZERO,
            speed: 3.0,
        }
    }
}

/// Closer than this the chaser stops pushing into the target.
const CHASE_STOP_DISTANCE: f32 = 1.2;

// ============================================================================
// Systems
// ============================================================================

/// System: evaluate every brain and emit its decisions.
pub fn tick_enemy_brains(
    mut brains: Query<(
        Entity,
        &mut EnemyBrain,
        &Transform,
        &ActionController,
        &Stamina,
        &Health,
        &mut MoveIntent,
    )>,
    targets: Query<(&Transform, &Health)>,
    mut rng: ResMut<DeterministicRng>,
    mut request_events: EventWriter<ActionRequested>,
) {
    for (entity, mut brain, transform, controller, stamina, health, mut intent) in
        brains.iter_mut()
    {
        let target_info = brain.target.and_then(|target| targets.get(target).ok());
        let distance_to_target = target_info.and_then(|(target_transform, target_health)| {
            target_health
                .is_alive()
                .then(|| transform.translation.distance(target_transform.translation))
        });

        let mut ctx = BrainContext {
            distance_to_target,
            is_dead: !health.is_alive(),
            stamina: stamina.current,
            current_action: controller.current_action().map(|action| action.id),
            normalized_time: controller.normalized_time(),
            attack_roll: rng.rng.gen::<f32>(),
            requested: None,
            chase: false,
        };

        brain.root.tick(&mut ctx);

        if let Some(action) = ctx.requested {
            request_events.write(ActionRequested { entity, action });
        }

        intent.direction = Vec3::ZERO;
        if ctx.chase {
            if let Some((target_transform, _)) = target_info {
                let to_target = target_transform.translation - transform.translation;
                if to_target.length() > CHASE_STOP_DISTANCE {
                    intent.direction = to_target.normalize_or_zero();
                }
            }
        }
    }
}

/// System: move actors by their intent. Acting or dead actors stand still
/// (actions own the root motion while they play).
pub fn apply_move_intents(
    mut movers: Query<(&MoveIntent, &mut Transform, Option<&ActionController>), Without<Dead>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (intent, mut transform, controller) in movers.iter_mut() {
        if controller.is_some_and(|c| c.is_acting()) {
            continue;
        }
        if intent.direction == Vec3::ZERO {
            continue;
        }

        let step = intent.direction * intent.speed * delta;
        transform.translation += step;

        // Face the way we walk so forward-reaching hitboxes line up
        let flat = Vec3::new(intent.direction.x, 0.0, intent.direction.z);
        if flat.length_squared() > 1e-6 {
            let target = transform.translation + flat;
            transform.look_at(target, Vec3::Y);
        }
    }
}

pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (tick_enemy_brains, apply_move_intents)
                .chain()
                .in_set(TickSet::Brains),
        );
    }
}
