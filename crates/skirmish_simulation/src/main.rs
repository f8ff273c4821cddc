//! Headless SKIRMISH duel.
//!
//! Two melee brawlers fight until one dies or the tick limit runs out.

use bevy::prelude::*;
use skirmish_simulation::ai::EnemyBrain;
use skirmish_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting SKIRMISH headless duel (seed: {seed})");

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let red = spawn_brawler(app.world_mut(), Vec3::new(0.0, 0.0, 0.0), 1);
    let blue = spawn_brawler(app.world_mut(), Vec3::new(6.0, 0.0, 0.0), 2);

    app.world_mut()
        .entity_mut(red)
        .insert(EnemyBrain::melee_brawler(blue));
    app.world_mut()
        .entity_mut(blue)
        .insert(EnemyBrain::melee_brawler(red));

    for tick in 0..1200 {
        run_fixed_ticks(&mut app, 1);

        if tick % 100 == 0 {
            report(app.world(), tick, red, blue);
        }

        let red_alive = is_alive(app.world(), red);
        let blue_alive = is_alive(app.world(), blue);
        if !red_alive || !blue_alive {
            report(app.world(), tick, red, blue);
            let winner = if red_alive { "red" } else { "blue" };
            println!("Duel over after {} ticks, {} wins", tick + 1, winner);
            return;
        }
    }

    println!("Tick limit reached, duel is a draw");
}

fn spawn_brawler(world: &mut World, position: Vec3, faction_id: u64) -> Entity {
    world
        .spawn((
            Transform::from_translation(position),
            Actor { faction_id },
            ActionController::default(),
            AnimationPlayback::default(),
            WeaponHitbox::default(),
            Hurtbox::default(),
            MoveIntent::default(),
        ))
        .id()
}

fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<Health>(entity)
        .map(|health| health.is_alive())
        .unwrap_or(false)
}

fn report(world: &World, tick: usize, red: Entity, blue: Entity) {
    let hp = |entity| {
        world
            .get::<Health>(entity)
            .map(|health: &Health| health.current)
            .unwrap_or(0)
    };
    println!("Tick {tick}: red HP {}, blue HP {}", hp(red), hp(blue));
}
