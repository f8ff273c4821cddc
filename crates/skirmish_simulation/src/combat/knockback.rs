//! Timed knockback displacement.
//!
//! Velocity decays linearly over the knockback duration:
//! `direction * (duration - elapsed) * strength`, applied per tick.

use bevy::prelude::*;

use crate::logger;

#[derive(Component, Debug, Clone)]
pub struct Knockback {
    pub direction: Vec3,
    pub duration: f32,
    pub strength: f32,
    timer: f32,
}

impl Knockback {
    pub fn new(direction: Vec3, duration: f32, strength: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            duration,
            strength,
            timer: 0.0,
        }
    }

    /// Displacement velocity at the current point of the knockback.
    pub fn velocity(&self) -> Vec3 {
        self.direction * (self.duration - self.timer).max(0.0) * self.strength
    }

    pub fn is_finished(&self) -> bool {
        self.timer > self.duration
    }

    pub fn tick(&mut self, delta: f32) {
        self.timer += delta;
    }
}

/// System: push knocked-back actors and drop the component when done.
pub fn apply_knockback(
    mut query: Query<(Entity, &mut Transform, &mut Knockback)>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut knockback) in query.iter_mut() {
        if knockback.is_finished() {
            commands.entity(entity).remove::<Knockback>();
            logger::log(&format!("✅ Knockback ended ({:?})", entity));
            continue;
        }

        transform.translation += knockback.velocity() * delta;
        knockback.tick(delta);
    }
}
