//! Combat realization: hit windows, overlap detection, damage, knockback.
//!
//! Tick order inside this subsystem (after the action controllers have
//! advanced):
//! 1. update_weapon_hitboxes: arm/disarm from the current hit window
//! 2. detect_hitbox_overlaps: sphere tests, one HitDelivered per target
//!    per activation
//! 3. apply_hits: i-frames, health, death, reaction requests
//! 4. apply_knockback, regenerate_stamina, disable_ai_on_death

use bevy::prelude::*;

pub mod damage;
pub mod hitbox;
pub mod knockback;
pub mod stamina;

pub use damage::{apply_hits, disable_ai_on_death, resolve_reaction, DamageDealt, Dead, EntityDied};
pub use hitbox::{detect_hitbox_overlaps, update_weapon_hitboxes, HitDelivered, Hurtbox, WeaponHitbox};
pub use knockback::{apply_knockback, Knockback};
pub use stamina::regenerate_stamina;

use crate::TickSet;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitDelivered>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (update_weapon_hitboxes, detect_hitbox_overlaps)
                .chain()
                .in_set(TickSet::HitWindows),
        );

        app.add_systems(
            FixedUpdate,
            (
                apply_hits,
                apply_knockback,
                regenerate_stamina,
                disable_ai_on_death,
            )
                .chain()
                .in_set(TickSet::Damage),
        );
    }
}
