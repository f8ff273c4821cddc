//! End-to-end action flow through the full simulation schedule:
//! combo buffering, hit gating, i-frames and forced reactions.

use bevy::prelude::*;
use skirmish_simulation::*;

fn create_app() -> App {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin);
    app
}

fn spawn_fighter(world: &mut World, position: Vec3, faction_id: u64) -> Entity {
    world
        .spawn((
            Transform::from_translation(position),
            Actor { faction_id },
            ActionController::default(),
            AnimationPlayback::default(),
            WeaponHitbox::default(),
            Hurtbox::default(),
        ))
        .id()
}

/// Target dummy: hittable, but no action controller of its own.
fn spawn_dummy(world: &mut World, position: Vec3, faction_id: u64) -> Entity {
    world
        .spawn((
            Transform::from_translation(position),
            Actor { faction_id },
            Hurtbox::default(),
        ))
        .id()
}

fn request(app: &mut App, entity: Entity, action: ActionId) {
    app.world_mut().send_event(ActionRequested { entity, action });
}

fn current_action(app: &App, entity: Entity) -> Option<ActionId> {
    app.world()
        .get::<ActionController>(entity)
        .unwrap()
        .current_action()
        .map(|action| action.id)
}

fn normalized_time(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<ActionController>(entity)
        .unwrap()
        .normalized_time()
}

fn health(app: &App, entity: Entity) -> u32 {
    app.world().get::<Health>(entity).unwrap().current
}

/// A follow-up requested before the chain
/// window opens is buffered, then fires the instant the window opens.
#[test]
fn test_combo_press_buffers_then_chains() {
    let mut app = create_app();
    let fighter = spawn_fighter(app.world_mut(), Vec3::ZERO, 1);

    request(&mut app, fighter, actions::LIGHT_ATTACK_1);
    run_fixed_ticks(&mut app, 1);
    assert_eq!(current_action(&app, fighter), Some(actions::LIGHT_ATTACK_1));

    // Drive to the middle of the swing: unlocked, chain window still shut
    while normalized_time(&app, fighter) < 0.5 {
        run_fixed_ticks(&mut app, 1);
    }

    request(&mut app, fighter, actions::LIGHT_ATTACK_2);
    run_fixed_ticks(&mut app, 1);

    // Not started yet: the press was early, so it sits in the buffer
    assert_eq!(current_action(&app, fighter), Some(actions::LIGHT_ATTACK_1));

    // The chain fires as soon as normalized time crosses can_chain_from
    let mut last_progress = normalized_time(&app, fighter);
    for _ in 0..20 {
        run_fixed_ticks(&mut app, 1);
        if current_action(&app, fighter) == Some(actions::LIGHT_ATTACK_2) {
            break;
        }
        last_progress = normalized_time(&app, fighter);
    }

    assert_eq!(current_action(&app, fighter), Some(actions::LIGHT_ATTACK_2));
    // The swing we chained out of had just opened its window (0.6)...
    assert!(last_progress >= 0.6 - 0.02, "chained too early: {last_progress}");
    assert!(last_progress < 0.7, "chained too late: {last_progress}");
    // ...and the follow-up restarted from the beginning
    assert!(normalized_time(&app, fighter) < 0.05);
}

/// A target overlapping the hitbox for the whole swing is hit exactly once.
#[test]
fn test_continuous_overlap_hits_once() {
    let mut app = create_app();
    // Default rotation: forward is -Z, so the weapon reaches toward -Z
    let attacker = spawn_fighter(app.world_mut(), Vec3::ZERO, 1);
    let dummy = spawn_dummy(app.world_mut(), Vec3::new(0.0, 0.0, -1.5), 2);

    request(&mut app, attacker, actions::LIGHT_ATTACK_1);
    // Run the entire action (clip 1.0s, ends at 0.95 -> 57 ticks) and then some
    run_fixed_ticks(&mut app, 70);

    assert_eq!(current_action(&app, attacker), None);
    // light_attack_1 deals 10 in its single window: exactly one hit landed
    assert_eq!(health(&app, dummy), 90);
}

/// A second hit window re-arms the gate: the same target is struck once
/// per window.
#[test]
fn test_second_window_rearms_hit_gate() {
    let mut app = create_app();
    let attacker = spawn_fighter(app.world_mut(), Vec3::ZERO, 1);
    let dummy = spawn_dummy(app.world_mut(), Vec3::new(0.0, 0.0, -1.5), 2);

    request(&mut app, attacker, actions::JUMP_SLAM);
    // Clip 1.6s, ends at 0.95 -> 92 ticks
    run_fixed_ticks(&mut app, 100);

    assert_eq!(current_action(&app, attacker), None);
    // jump_slam: leap impact 15 + shockwave 10, one hit each
    assert_eq!(health(&app, dummy), 75);
}

/// I-frames swallow hits entirely: no damage, no reaction.
#[test]
fn test_dodge_iframes_ignore_hit() {
    let mut app = create_app();
    let attacker = spawn_fighter(app.world_mut(), Vec3::ZERO, 1);
    let victim = spawn_fighter(app.world_mut(), Vec3::new(0.0, 0.0, -1.5), 2);

    // Started together: the attack's hit window [0.35, 0.55]s sits inside
    // the dodge's i-frames [0.08, 0.48]s... up to 0.48, which covers the
    // first overlap tick. Hit gating marks the target on delivery,
    // so the ignored hit is not retried when the i-frames end.
    request(&mut app, attacker, actions::LIGHT_ATTACK_1);
    request(&mut app, victim, actions::DODGE_ROLL);
    run_fixed_ticks(&mut app, 70);

    assert_eq!(health(&app, victim), 100);
    // The victim was never staggered
    assert_ne!(current_action(&app, victim), Some(actions::HIT_REACTION));
}

/// A landed hit forces a reaction through the victim's own controller,
/// interrupting whatever it was doing and discarding its buffered input.
#[test]
fn test_hit_interrupts_victims_swing() {
    let mut app = create_app();
    let attacker = spawn_fighter(app.world_mut(), Vec3::ZERO, 1);
    let victim = spawn_fighter(app.world_mut(), Vec3::new(0.0, 0.0, -1.5), 2);

    request(&mut app, attacker, actions::LIGHT_ATTACK_1);
    request(&mut app, victim, actions::LIGHT_ATTACK_1);
    run_fixed_ticks(&mut app, 18);

    // The victim queues a follow-up it will never get to use
    request(&mut app, victim, actions::LIGHT_ATTACK_2);
    run_fixed_ticks(&mut app, 1);
    assert!(app
        .world()
        .get::<ActionController>(victim)
        .unwrap()
        .has_buffered_action());

    // Run past the attacker's hit window
    run_fixed_ticks(&mut app, 40);

    assert_eq!(health(&app, victim), 90);
    assert_eq!(current_action(&app, victim), Some(actions::HIT_REACTION));
    // Force-interrupt wiped the buffered follow-up: clean slate
    assert!(!app
        .world()
        .get::<ActionController>(victim)
        .unwrap()
        .has_buffered_action());
}

/// Killing blow routes the victim into the uninterruptible death action.
#[test]
fn test_killing_blow_forces_death_action() {
    let mut app = create_app();
    let attacker = spawn_fighter(app.world_mut(), Vec3::ZERO, 1);
    let victim = spawn_fighter(app.world_mut(), Vec3::new(0.0, 0.0, -1.5), 2);

    app.world_mut().get_mut::<Health>(victim).unwrap().current = 5;

    request(&mut app, attacker, actions::LIGHT_ATTACK_1);
    run_fixed_ticks(&mut app, 70);

    assert_eq!(health(&app, victim), 0);
    assert_eq!(current_action(&app, victim), Some(actions::DEATH));
    assert!(app.world().get::<Dead>(victim).is_some());

    // Dead targets ignore any further hits
    request(&mut app, attacker, actions::LIGHT_ATTACK_1);
    run_fixed_ticks(&mut app, 70);
    assert_eq!(health(&app, victim), 0);
    assert_eq!(current_action(&app, victim), Some(actions::DEATH));
}
