//! Hit application: i-frame gating, health, death and reaction routing.

use bevy::prelude::*;

use crate::action::{actions, ActionController, ActionId, ActionPriority, ActionRequested};
use crate::combat::hitbox::HitDelivered;
use crate::combat::knockback::Knockback;
use crate::components::Health;
use crate::logger;

/// Damage landed on a target (after i-frame gating). Carries impact data
/// for the visual layer.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
    pub hit_point: Vec3,
    pub hit_direction: Vec3,
}

/// A target's health reached zero.
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Marker: entity is dead. Dead targets ignore further hits; corpses stay.
#[derive(Component, Debug)]
pub struct Dead;

/// Reaction an incoming hit forces on its victim.
///
/// Death wins; a hit sourced from a Knockdown-or-higher action floors the
/// target; anything else staggers.
pub fn resolve_reaction(source_priority: ActionPriority, died: bool) -> ActionId {
    if died {
        return actions::DEATH;
    }
    if source_priority >= ActionPriority::Knockdown {
        return actions::KNOCKDOWN;
    }
    actions::HIT_REACTION
}

/// System: apply delivered hits.
///
/// Per hit: skip self-hits and dead targets; an invulnerable target
/// (i-frames active on its controller) ignores the hit entirely; otherwise
/// damage lands, knockback starts, and the resolved reaction is requested
/// through the target's own action controller, which is what lets a heavy
/// hit force-interrupt whatever the victim was doing.
pub fn apply_hits(
    mut hit_events: EventReader<HitDelivered>,
    mut targets: Query<(&mut Health, Option<&ActionController>, Has<Dead>)>,
    source_actions: Query<&ActionController>,
    mut commands: Commands,
    mut damage_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
    mut request_events: EventWriter<ActionRequested>,
) {
    for hit in hit_events.read() {
        if hit.attacker == hit.target {
            continue;
        }

        let Ok((mut health, controller, is_dead)) = targets.get_mut(hit.target) else {
            continue;
        };

        if is_dead {
            continue;
        }

        if controller.is_some_and(|c| c.is_invulnerable()) {
            logger::log(&format!(
                "🛡️ Hit ignored, target invulnerable ({:?})",
                hit.target
            ));
            continue;
        }

        let was_alive = health.is_alive();
        health.take_damage(hit.damage);
        let died = was_alive && !health.is_alive();

        damage_events.write(DamageDealt {
            attacker: hit.attacker,
            target: hit.target,
            damage: hit.damage,
            target_died: died,
            hit_point: hit.hit_point,
            hit_direction: hit.hit_direction,
        });

        logger::log(&format!(
            "💥 Hit landed: {:?} → {:?} for {} (HP: {})",
            hit.attacker, hit.target, hit.damage, health.current
        ));

        if hit.knockback > 0.0 && !died {
            commands
                .entity(hit.target)
                .insert(Knockback::new(hit.hit_direction, 0.3, hit.knockback));
        }

        if died {
            commands.entity(hit.target).insert(Dead);
            died_events.write(EntityDied {
                entity: hit.target,
                killer: Some(hit.attacker),
            });
            logger::log_info(&format!(
                "☠️ Entity {:?} killed by {:?}",
                hit.target, hit.attacker
            ));
        }

        // Route the forced reaction through the victim's own controller
        if controller.is_some() {
            let source_priority = source_actions
                .get(hit.attacker)
                .ok()
                .and_then(|c| c.current_action())
                .map(|a| a.priority)
                .unwrap_or(ActionPriority::Attack);

            request_events.write(ActionRequested {
                entity: hit.target,
                action: resolve_reaction(source_priority, died),
            });
        }
    }
}

/// System: strip AI from dead entities so corpses stop deciding and moving.
pub fn disable_ai_on_death(
    mut death_events: EventReader<EntityDied>,
    mut commands: Commands,
) {
    for event in death_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.remove::<crate::ai::EnemyBrain>();
            entity_commands.remove::<crate::ai::MoveIntent>();
        }
    }
}
