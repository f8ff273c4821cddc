//! Base actor components: Actor, Health, Stamina

use bevy::prelude::*;

/// A living combatant (player, enemy NPC).
///
/// Automatically brings Health and Stamina through required components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Stamina)]
pub struct Actor {
    /// Stable faction id (attacks never land on same-faction targets)
    pub faction_id: u64,
}

/// Actor health.
///
/// Invariant: 0 <= current <= max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Stamina spent by actions (each action carries its own cost).
///
/// Invariant: 0.0 <= current <= max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
    pub regen_rate: f32, // units per second
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Stamina {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            regen_rate: 15.0,
        }
    }

    pub fn can_afford(&self, cost: f32) -> bool {
        self.current >= cost
    }

    pub fn consume(&mut self, cost: f32) -> bool {
        if self.can_afford(cost) {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    pub fn regenerate(&mut self, delta_time: f32) {
        self.current = (self.current + self.regen_rate * delta_time).min(self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_saturates() {
        let mut health = Health::new(100);
        health.take_damage(30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        health.take_damage(100);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal_clamps_to_max() {
        let mut health = Health::new(100);
        health.take_damage(50);
        health.heal(80);
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_stamina_consume_and_regen() {
        let mut stamina = Stamina::new(100.0);
        assert!(stamina.consume(30.0));
        assert_eq!(stamina.current, 70.0);

        assert!(!stamina.consume(80.0));
        assert_eq!(stamina.current, 70.0);

        stamina.regenerate(2.0);
        assert_eq!(stamina.current, 100.0);
    }
}
