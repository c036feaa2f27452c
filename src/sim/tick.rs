//! Per-frame simulation tick
//!
//! One call per rendered frame: Spawner → Integrator → Collision Resolver →
//! Lifecycle Pruner → Difficulty/Score. The renderer reads the state only
//! after `tick` returns.

use glam::Vec2;
use thiserror::Error;

use super::collision;
use super::difficulty::{apply_report, update_difficulty};
use super::integrate::{advance_effects, advance_entities, recover_feel, steer_craft};
use super::prune::{prune, prune_effects};
use super::spawn::{fire_if_ready, spawn_obstacle_if_due};
use super::state::{GameEvent, GameState, GameStatus, Viewport};
use crate::consts::*;

/// Commands rejected at the simulation boundary
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SimError {
    #[error("speed multiplier must be a positive finite number, got {0}")]
    InvalidSpeedMultiplier(f32),
    #[error("command not allowed while {0:?}")]
    InvalidTransition(GameStatus),
}

/// Host samples for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Seconds since the previous tick
    pub delta: f32,
    /// Monotonic host clock (seconds)
    pub elapsed: f64,
    /// Latest pointer sample, normalized to [-1, 1] on both axes
    pub pointer: Vec2,
    /// Viewport size in world units, when the renderer reports a change
    pub viewport: Option<Viewport>,
}

/// Begin the first run from the start screen
///
/// Resets the craft, empties every store, zeroes score and difficulty and
/// restores full lives. The high score is kept.
pub fn start(state: &mut GameState, speed_multiplier: f32, seed: u64) -> Result<(), SimError> {
    if state.status != GameStatus::Start {
        return Err(SimError::InvalidTransition(state.status));
    }
    begin_run(state, speed_multiplier, seed)
}

/// Start over after a game over, at a freshly chosen speed multiplier
pub fn restart(state: &mut GameState, speed_multiplier: f32, seed: u64) -> Result<(), SimError> {
    if state.status != GameStatus::GameOver {
        return Err(SimError::InvalidTransition(state.status));
    }
    log::info!("Restarting after score {}", state.score);
    begin_run(state, speed_multiplier, seed)
}

fn begin_run(state: &mut GameState, speed_multiplier: f32, seed: u64) -> Result<(), SimError> {
    if !speed_multiplier.is_finite() || speed_multiplier <= 0.0 {
        return Err(SimError::InvalidSpeedMultiplier(speed_multiplier));
    }
    state.reset_run(seed, speed_multiplier);
    state.events.push(GameEvent::RunStarted { speed_multiplier });
    log::info!(
        "Run started: speed x{:.2}, seed {}, best {}",
        speed_multiplier,
        seed,
        state.high_score
    );
    Ok(())
}

/// Frame delta actually integrated: finite, non-negative, at most `MAX_FRAME_DELTA`
fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() {
        delta.clamp(0.0, MAX_FRAME_DELTA)
    } else {
        0.0
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    let dt = sanitize_delta(input.delta);
    if let Some(viewport) = input.viewport {
        state.viewport = viewport;
    }

    recover_feel(state, dt);

    if state.status != GameStatus::Playing {
        // Only explosions keep going outside a run
        state.projectiles.clear();
        state.obstacles.clear();
        advance_effects(state, dt);
        prune_effects(state);
        return;
    }

    // Run clock: relative to the run's first tick, never moves backwards
    let started = *state.run_started_at.get_or_insert(input.elapsed);
    let since_start = (input.elapsed - started).max(0.0) as f32;
    state.run_clock = state.run_clock.max(since_start);

    let viewport = state.viewport;
    match state.craft.as_mut() {
        Some(craft) => steer_craft(craft, input.pointer, viewport, dt),
        None => {
            advance_effects(state, dt);
            prune_effects(state);
            return;
        }
    }

    spawn_obstacle_if_due(state);
    fire_if_ready(state);

    advance_entities(state, dt);

    let report = collision::resolve(state);

    prune(state);

    update_difficulty(state);
    apply_report(state, &report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Obstacle, ObstacleKind, Projectile};
    use glam::Vec3;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn started(speed: f32) -> GameState {
        let mut state = GameState::new(12345);
        start(&mut state, speed, 12345).expect("valid speed");
        state
    }

    fn input_at(frame: u32) -> TickInput {
        TickInput {
            delta: DT,
            elapsed: frame as f64 * DT as f64,
            ..Default::default()
        }
    }

    fn craft_pos(state: &GameState) -> Vec3 {
        state.craft.as_ref().map(|c| c.pos).unwrap_or_default()
    }

    /// Parks an obstacle just behind the craft, out of the projectiles' reach
    fn ram_craft(state: &mut GameState) -> u32 {
        let id = state.next_entity_id();
        let pos = craft_pos(state) + Vec3::Z * 1.0;
        state
            .obstacles
            .push(Obstacle::new(id, ObstacleKind::Scout, pos, 0.0));
        id
    }

    #[test]
    fn test_start_rejects_bad_multiplier() {
        let mut state = GameState::new(1);
        assert_eq!(
            start(&mut state, 0.0, 1),
            Err(SimError::InvalidSpeedMultiplier(0.0))
        );
        assert!(start(&mut state, f32::NAN, 1).is_err());
        assert!(start(&mut state, -1.0, 1).is_err());
        assert_eq!(state.status, GameStatus::Start);
        assert!(state.craft.is_none());
    }

    #[test]
    fn test_start_resets_run() {
        let mut state = started(1.0);
        state.score = 900;
        state.lives = 1;
        state.high_score = 900;
        state.status = GameStatus::GameOver;
        restart(&mut state, 0.65, 2).expect("valid speed");
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.difficulty, 0.0);
        assert_eq!(state.speed_multiplier, 0.65);
        assert_eq!(state.high_score, 900);
        assert!(state.obstacles.is_empty() && state.projectiles.is_empty());
    }

    #[test]
    fn test_start_only_from_start_screen() {
        let mut state = started(1.0);
        state.score = 450;
        assert_eq!(
            start(&mut state, 1.0, 3),
            Err(SimError::InvalidTransition(GameStatus::Playing))
        );
        assert_eq!(state.score, 450);

        state.status = GameStatus::GameOver;
        assert_eq!(
            start(&mut state, 1.0, 3),
            Err(SimError::InvalidTransition(GameStatus::GameOver))
        );
        assert_eq!(state.status, GameStatus::GameOver);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut state = GameState::new(1);
        assert_eq!(
            restart(&mut state, 1.0, 1),
            Err(SimError::InvalidTransition(GameStatus::Start))
        );
        assert_eq!(state.status, GameStatus::Start);

        let mut state = started(1.0);
        state.score = 450;
        assert_eq!(
            restart(&mut state, 1.0, 3),
            Err(SimError::InvalidTransition(GameStatus::Playing))
        );
        assert_eq!(state.score, 450);
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_restart_rejects_bad_multiplier() {
        let mut state = started(1.0);
        state.status = GameStatus::GameOver;
        assert!(restart(&mut state, 0.0, 2).is_err());
        assert_eq!(state.status, GameStatus::GameOver);
    }

    #[test]
    fn test_reported_viewport_bounds_spawns_and_craft() {
        let mut state = started(1.0);
        // Portrait canvas
        let narrow = Viewport::from_aspect(9.0 / 16.0);
        assert!(narrow.width < Viewport::default().width);
        for frame in 0..600 {
            if let Some(craft) = state.craft.as_mut() {
                craft.invulnerable_until = f32::MAX;
            }
            let input = TickInput {
                pointer: Vec2::new(1.0, 0.0),
                viewport: (frame == 0).then_some(narrow),
                ..input_at(frame)
            };
            tick(&mut state, &input);
            for o in &state.obstacles {
                assert!(o.pos.x.abs() <= narrow.width * SPAWN_WIDTH_FACTOR / 2.0 + 1e-4);
            }
        }
        assert_eq!(state.viewport, narrow);
        let x = craft_pos(&state).x;
        assert!(x <= narrow.width / 2.0 - CRAFT_X_MARGIN + 1e-4);
        assert!(x > narrow.width / 2.0 - CRAFT_X_MARGIN - 0.1);
    }

    #[test]
    fn test_tick_before_start_is_inert() {
        let mut state = GameState::new(1);
        tick(&mut state, &input_at(1));
        assert_eq!(state.status, GameStatus::Start);
        assert!(state.obstacles.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_missing_craft_skips_movement_and_collision() {
        let mut state = started(1.0);
        state.craft = None;
        tick(&mut state, &input_at(0));
        assert!(state.obstacles.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_first_tick_spawns_and_fires() {
        let mut state = started(1.0);
        tick(&mut state, &input_at(0));
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_scenario_scout_kill_scores_150() {
        let mut state = started(1.0);
        let pos = craft_pos(&state);
        let pid = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(pid, Vec3::new(pos.x, pos.y, -19.0)));
        let oid = state.next_entity_id();
        state.obstacles.push(Obstacle::new(
            oid,
            ObstacleKind::Scout,
            Vec3::new(pos.x, pos.y, -20.5),
            30.0,
        ));

        tick(&mut state, &input_at(0));

        assert_eq!(state.score, 150);
        assert!(state.obstacles.iter().all(|o| o.id != oid));
        assert!(state.projectiles.iter().all(|p| p.id != pid));
        assert_eq!(state.effects.len(), 1);
        let effect = &state.effects[0];
        assert!((effect.origin - Vec3::new(pos.x, pos.y, -20.0)).length() < 1e-3);
        assert!(!effect.is_mega);
        assert!(state.events.contains(&GameEvent::ObstacleDestroyed {
            id: oid,
            kind: ObstacleKind::Scout,
            points: 150,
        }));
    }

    #[test]
    fn test_scenario_goliath_kill_is_mega() {
        let mut state = started(1.0);
        let pos = craft_pos(&state);
        let pid = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(pid, Vec3::new(pos.x, pos.y, -19.0)));
        let oid = state.next_entity_id();
        state.obstacles.push(Obstacle::new(
            oid,
            ObstacleKind::Goliath,
            Vec3::new(pos.x, pos.y, -20.5),
            10.0,
        ));

        tick(&mut state, &input_at(0));

        assert_eq!(state.score, 1000);
        assert_eq!(state.effects.len(), 1);
        let effect = &state.effects[0];
        assert!(effect.is_mega);
        assert_eq!(effect.particles.len(), MEGA_EFFECT_PARTICLES);
        assert_eq!(effect.decay_rate(), MEGA_EFFECT_DECAY);
        assert!(effect.decay_rate() < EFFECT_DECAY);
    }

    #[test]
    fn test_scenario_three_spaced_hits_end_run() {
        let mut state = started(1.0);
        let mut frame = 0;
        for expected_lives in [2u8, 1, 0] {
            assert_eq!(state.status, GameStatus::Playing);
            ram_craft(&mut state);
            tick(&mut state, &input_at(frame));
            assert_eq!(state.lives, expected_lives);
            // Jump the clock past the invulnerability window
            frame += ((INVULNERABILITY_SECS + 0.1) / DT) as u32;
        }
        assert_eq!(state.status, GameStatus::GameOver);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_invulnerability_blocks_followup_hits() {
        let mut state = started(1.0);
        ram_craft(&mut state);
        tick(&mut state, &input_at(0));
        assert_eq!(state.lives, START_LIVES - 1);

        // Inside the window: several obstacles on the craft cost nothing
        state.drain_events();
        let behind = craft_pos(&state) + Vec3::Z * 1.0;
        ram_craft(&mut state);
        for offset in [Vec3::X * 0.3, Vec3::NEG_Y * 0.3] {
            let id = state.next_entity_id();
            state
                .obstacles
                .push(Obstacle::new(id, ObstacleKind::Stinger, behind + offset, 0.0));
        }
        tick(&mut state, &input_at(30));
        assert_eq!(state.lives, START_LIVES - 1);
        assert!(!state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::CraftHit { .. })));
    }

    #[test]
    fn test_scenario_ace_minute_reaches_floor_interval() {
        let mut state = started(1.4);
        for frame in 0..=3600 {
            if let Some(craft) = state.craft.as_mut() {
                craft.invulnerable_until = f32::MAX;
            }
            tick(&mut state, &input_at(frame));
        }
        assert_eq!(state.status, GameStatus::Playing);
        assert!((state.difficulty - 1.4).abs() < 1e-3);
        assert_eq!(
            crate::sim::difficulty::spawn_interval(state.difficulty, 1.4),
            SPAWN_INTERVAL_FLOOR
        );
    }

    #[test]
    fn test_game_over_lets_effects_finish() {
        let mut state = started(1.0);
        state.lives = 1;
        ram_craft(&mut state);
        tick(&mut state, &input_at(0));
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.effects.len(), 1);

        tick(&mut state, &input_at(1));
        assert!(state.obstacles.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.effects.len(), 1);

        for frame in 2..120 {
            tick(&mut state, &input_at(frame));
        }
        assert!(state.effects.is_empty());
        assert_eq!(state.status, GameStatus::GameOver);
    }

    #[test]
    fn test_delta_spike_is_clamped() {
        let mut state = started(1.0);
        let oid = state.next_entity_id();
        state.obstacles.push(Obstacle::new(
            oid,
            ObstacleKind::Ghost,
            Vec3::new(50.0, 50.0, -40.0),
            10.0,
        ));
        let input = TickInput {
            delta: 5.0,
            ..Default::default()
        };
        tick(&mut state, &input);
        let moved = state
            .obstacles
            .iter()
            .find(|o| o.id == oid)
            .map(|o| o.pos.z + 40.0)
            .unwrap_or_default();
        assert!((moved - 10.0 * MAX_FRAME_DELTA).abs() < 1e-4);
    }

    #[test]
    fn test_determinism() {
        let mut a = started(1.0);
        let mut b = started(1.0);
        for frame in 0..600 {
            let mut input = input_at(frame);
            input.pointer = Vec2::new((frame as f32 * 0.05).sin(), 0.2);
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.effects.len(), b.effects.len());
        assert_eq!(craft_pos(&a), craft_pos(&b));
    }

    proptest! {
        #[test]
        fn prop_difficulty_never_decreases(
            steps in prop::collection::vec((0.0f32..0.2, -1.0f64..2.0), 1..200)
        ) {
            let mut state = started(1.0);
            let mut elapsed = 0.0f64;
            let mut last = state.difficulty;
            for (delta, jump) in steps {
                elapsed += jump;
                if let Some(craft) = state.craft.as_mut() {
                    craft.invulnerable_until = f32::MAX;
                }
                tick(&mut state, &TickInput { delta, elapsed, ..Default::default() });
                prop_assert!(state.difficulty >= last);
                last = state.difficulty;
            }
        }

        #[test]
        fn prop_time_scale_stays_positive(seed in any::<u64>(), frames in 1u32..400) {
            let mut state = GameState::new(seed);
            start(&mut state, 1.4, seed).expect("valid speed");
            for frame in 0..frames {
                let mut input = input_at(frame);
                input.pointer = Vec2::new(((frame + seed as u32 % 7) as f32 * 0.1).cos(), 0.0);
                tick(&mut state, &input);
                prop_assert!(state.time_scale > 0.0 && state.time_scale <= 1.0);
            }
        }

        #[test]
        fn prop_obstacle_stats_follow_kind(seed in any::<u64>(), frames in 1u32..300) {
            let mut state = GameState::new(seed);
            start(&mut state, 1.0, seed).expect("valid speed");
            for frame in 0..frames {
                tick(&mut state, &input_at(frame));
                for o in &state.obstacles {
                    let profile = o.kind().profile();
                    prop_assert_eq!(o.points(), profile.points);
                    prop_assert_eq!(o.hit_radius(), profile.hit_radius);
                }
            }
        }

        #[test]
        fn prop_entity_ids_unique(seed in any::<u64>(), frames in 1u32..300) {
            let mut state = GameState::new(seed);
            start(&mut state, 1.4, seed).expect("valid speed");
            for frame in 0..frames {
                tick(&mut state, &input_at(frame));
            }
            let mut ids: Vec<u32> = state
                .projectiles
                .iter()
                .map(|p| p.id)
                .chain(state.obstacles.iter().map(|o| o.id))
                .chain(state.effects.iter().map(|e| e.id))
                .collect();
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }
    }
}
