//! SKIRMISH simulation core.
//!
//! Headless, fixed-timestep combat simulation: per-actor action state
//! machines (combos, input buffering, priority interrupts), hit-window
//! driven weapon hitboxes, and behavior-tree enemy brains. The rendering /
//! engine layer is an external consumer: it feeds `ActionRequested` events
//! in, listens to `ActionStarted`/`ActionEnded`/`DamageDealt` coming out,
//! and mirrors the `AnimationPlayback` adapter onto real skeletal playback.
//!
//! Tick order (60 Hz FixedUpdate):
//! Brains → Actions (playback advance, request arbitration, drive loop) →
//! HitWindows (arm/disarm, overlap) → Damage (hits, knockback, stamina).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod action;
pub mod ai;
pub mod animation;
pub mod combat;
pub mod components;
pub mod logger;

pub use action::{
    actions, ActionBuffer, ActionController, ActionDefinition, ActionEnded, ActionHandle,
    ActionId, ActionInterrupted, ActionKind, ActionLibrary, ActionPlugin, ActionPriority,
    ActionRequested, ActionStarted, ActionState, AnimationClip, DefinitionError, HitWindow,
    TimeWindow,
};
pub use ai::{AIPlugin, EnemyBrain, MoveIntent};
pub use animation::AnimationPlayback;
pub use combat::{
    CombatPlugin, DamageDealt, Dead, EntityDied, HitDelivered, Hurtbox, Knockback, WeaponHitbox,
};
pub use components::*;

/// Stage ordering of one simulation tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// AI decisions (request events for this tick)
    Brains,
    /// Playback advance, request arbitration, controller drive
    Actions,
    /// Hit-window arm/disarm and overlap detection
    HitWindows,
    /// Hit application, knockback, stamina upkeep
    Damage,
}

/// Main simulation plugin: tick ordering plus every subsystem.
///
/// Installs the default action library and a seed-42 RNG unless the app
/// already provides its own.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        if !app.world().contains_resource::<ActionLibrary>() {
            app.insert_resource(
                ActionLibrary::character_default().expect("default action set must validate"),
            );
        }

        app.configure_sets(
            FixedUpdate,
            (
                TickSet::Brains,
                TickSet::Actions,
                TickSet::HitWindows,
                TickSet::Damage,
            )
                .chain(),
        );

        app.add_plugins((ActionPlugin, CombatPlugin, AIPlugin));
    }
}

/// Seeded RNG resource, the only randomness source in the simulation.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal Bevy app for headless simulation.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app
}

/// Runs exactly `ticks` fixed simulation steps.
///
/// Advances `Time<Fixed>` by its own timestep and executes the FixedUpdate
/// schedule directly, so tick counts are exact instead of depending on
/// wall-clock accumulation.
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        let timestep = app.world().resource::<Time<Fixed>>().timestep();
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(timestep);
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Byte snapshot of one component type across the world, entity-sorted,
/// for determinism comparisons.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
