//! Stamina regeneration.
//!
//! Costs are paid where actions start (see `action::controller`); this
//! module only refills the pool between actions.

use bevy::prelude::*;

use crate::action::ActionController;
use crate::combat::damage::Dead;
use crate::components::Stamina;

/// System: regenerate stamina for living actors that are not mid-action.
pub fn regenerate_stamina(
    mut actors: Query<(&mut Stamina, Option<&ActionController>), Without<Dead>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut stamina, controller) in actors.iter_mut() {
        if controller.is_some_and(|c| c.is_acting()) {
            continue;
        }
        stamina.regenerate(delta);
    }
}

#[cfg(test)]
mod tests {
    use crate::components::Stamina;

    #[test]
    fn test_regen_clamps_at_max() {
        let mut stamina = Stamina::new(100.0);
        stamina.consume(40.0);

        stamina.regenerate(1.0);
        assert_eq!(stamina.current, 75.0);

        stamina.regenerate(10.0);
        assert_eq!(stamina.current, 100.0);
    }
}
