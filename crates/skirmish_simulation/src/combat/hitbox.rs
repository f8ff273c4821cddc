//! Weapon hitbox activation and overlap detection.
//!
//! The hitbox has no timing knowledge of its own: every tick it asks the
//! actor's action controller which hit window (if any) the current
//! normalized time falls into. Entering a window arms the collider and
//! clears the already-hit list; leaving it disarms. The already-hit list
//! guarantees at most one hit per target per activation even though the
//! overlap test runs every tick the window stays open. A later window of
//! the same action re-arms and may strike the same target again.

use bevy::prelude::*;

use crate::action::{ActionController, ActionId};
use crate::components::Health;
use crate::logger;

// ============================================================================
// Components
// ============================================================================

/// Weapon hit volume carried by an attacker.
///
/// Sphere of `radius` centered `reach` meters in front of the actor.
/// `damage`/`knockback` are latched from the hit window on activation.
#[derive(Component, Debug, Clone)]
pub struct WeaponHitbox {
    pub reach: f32,
    pub radius: f32,
    /// Index of the open hit window, or None while disarmed
    pub active_window: Option<usize>,
    /// Targets struck during the current activation
    pub already_hit: Vec<Entity>,
    pub damage: u32,
    pub knockback: f32,
}

impl Default for WeaponHitbox {
    fn default() -> Self {
        Self {
            reach: 1.2,
            radius: 0.8,
            active_window: None,
            already_hit: Vec::new(),
            damage: 0,
            knockback: 0.0,
        }
    }
}

impl WeaponHitbox {
    pub fn is_active(&self) -> bool {
        self.active_window.is_some()
    }

    /// Arms the hitbox for window `index`: clears hit gating and latches
    /// the window payload.
    pub fn activate(&mut self, index: usize, damage: u32, knockback: f32) {
        self.already_hit.clear();
        self.active_window = Some(index);
        self.damage = damage;
        self.knockback = knockback;
    }

    /// Disarms. The already-hit list is retained until the next activation
    /// so late overlap queries of a closed window cannot double-hit.
    pub fn deactivate(&mut self) {
        self.active_window = None;
    }
}

/// Hit-receiving volume: a sphere around the target's position.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub radius: f32,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

// ============================================================================
// Events
// ============================================================================

/// One confirmed weapon contact. At most one per target per activation.
#[derive(Event, Debug, Clone)]
pub struct HitDelivered {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub knockback: f32,
    pub hit_point: Vec3,
    pub hit_direction: Vec3,
    /// Action the hit originated from (reaction resolution reads its priority)
    pub source_action: ActionId,
}

// ============================================================================
// Systems
// ============================================================================

/// System: arm/disarm weapon hitboxes from the current action's hit windows.
///
/// Windows are scanned in declaration order; the first one containing the
/// current normalized time wins. Switching to a *different* window index
/// re-activates (clearing hit gating); staying inside the same window
/// changes nothing; no match disarms.
pub fn update_weapon_hitboxes(mut weapons: Query<(Entity, &ActionController, &mut WeaponHitbox)>) {
    for (entity, controller, mut hitbox) in weapons.iter_mut() {
        let Some(action) = controller.current_action() else {
            hitbox.deactivate();
            continue;
        };
        if action.hit_windows.is_empty() {
            hitbox.deactivate();
            continue;
        }

        let t = controller.normalized_time();

        let open = action
            .hit_windows
            .iter()
            .enumerate()
            .find(|(_, window)| t >= window.start && t <= window.end);

        match open {
            Some((index, window)) => {
                if hitbox.active_window != Some(index) {
                    hitbox.activate(index, window.damage, window.knockback);
                    logger::log(&format!(
                        "🗡️ Hit window {} of '{}' armed ({:?})",
                        index, action.name, entity
                    ));
                }
            }
            None => {
                if hitbox.is_active() {
                    hitbox.deactivate();
                }
            }
        }
    }
}

/// System: overlap test for every armed hitbox.
///
/// Plain sphere-vs-sphere check against each hurtbox; targets already in
/// the hit list are skipped, so continuous overlap (or leave-and-re-enter)
/// within one activation delivers exactly one hit.
pub fn detect_hitbox_overlaps(
    mut weapons: Query<(Entity, &Transform, &mut WeaponHitbox)>,
    targets: Query<(Entity, &Transform, &Hurtbox), With<Health>>,
    attackers: Query<&ActionController>,
    mut hit_events: EventWriter<HitDelivered>,
) {
    for (attacker, attacker_transform, mut hitbox) in weapons.iter_mut() {
        if !hitbox.is_active() {
            continue;
        }

        let Ok(controller) = attackers.get(attacker) else {
            continue;
        };
        let Some(action) = controller.current_action() else {
            continue;
        };
        let source_action = action.id;

        let hitbox_pos =
            attacker_transform.translation + attacker_transform.forward() * hitbox.reach;

        for (target, target_transform, hurtbox) in targets.iter() {
            if target == attacker {
                continue;
            }
            if hitbox.already_hit.contains(&target) {
                continue;
            }

            let target_pos = target_transform.translation;
            let distance = hitbox_pos.distance(target_pos);

            if distance <= hitbox.radius + hurtbox.radius {
                let hit_direction = (target_pos - hitbox_pos).normalize_or_zero();
                // Contact point on the hurtbox surface facing the weapon
                let hit_point = target_pos - hit_direction * hurtbox.radius;

                hitbox.already_hit.push(target);
                hit_events.write(HitDelivered {
                    attacker,
                    target,
                    damage: hitbox.damage,
                    knockback: hitbox.knockback,
                    hit_point,
                    hit_direction,
                    source_action,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_clears_hit_gating_and_latches_payload() {
        let mut hitbox = WeaponHitbox::default();
        hitbox.already_hit.push(Entity::PLACEHOLDER);

        hitbox.activate(0, 10, 2.0);
        assert!(hitbox.already_hit.is_empty());
        assert_eq!(hitbox.active_window, Some(0));
        assert_eq!(hitbox.damage, 10);
    }

    #[test]
    fn test_deactivation_retains_hit_list() {
        let mut hitbox = WeaponHitbox::default();
        hitbox.activate(0, 10, 2.0);
        hitbox.already_hit.push(Entity::PLACEHOLDER);

        hitbox.deactivate();
        assert!(!hitbox.is_active());
        assert_eq!(hitbox.already_hit.len(), 1);

        // Next window re-arms the gate
        hitbox.activate(1, 8, 1.0);
        assert!(hitbox.already_hit.is_empty());
        assert_eq!(hitbox.active_window, Some(1));
    }

    #[test]
    fn test_sphere_overlap_check() {
        let hitbox_pos = Vec3::ZERO;
        let near = Vec3::new(1.0, 0.0, 0.0);
        let far = Vec3::new(2.0, 0.0, 0.0);
        let combined = 0.8 + 0.5;

        assert!(hitbox_pos.distance(near) <= combined);
        assert!(hitbox_pos.distance(far) > combined);
    }
}
