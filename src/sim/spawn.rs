//! Obstacle and projectile spawning
//!
//! Spawn decisions take the random source as a parameter so tests can replay
//! exact sequences with a seeded generator.

use glam::Vec3;
use rand::Rng;

use super::difficulty::{fire_cooldown, spawn_interval};
use super::state::{Craft, GameState, Obstacle, ObstacleKind, Projectile, Viewport};
use crate::consts::*;

/// Pick an obstacle kind from the weighted table
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R) -> ObstacleKind {
    let total: u32 = ObstacleKind::ALL.iter().map(|k| k.profile().weight).sum();
    let mut roll = rng.random_range(0..total);
    for kind in ObstacleKind::ALL {
        let weight = kind.profile().weight;
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    ObstacleKind::Scout
}

/// Build a new obstacle at the far plane
pub fn spawn_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    difficulty: f32,
    speed_multiplier: f32,
    viewport: Viewport,
) -> Obstacle {
    let x = (rng.random::<f32>() - 0.5) * viewport.width * SPAWN_WIDTH_FACTOR;
    // Keep clear of the HUD band at the top of the screen
    let y = ((rng.random::<f32>() - 0.5) * viewport.height + SPAWN_Y_OFFSET)
        .min(viewport.height * SPAWN_CEILING_FRACTION);
    let kind = roll_kind(rng);

    let base = OBSTACLE_BASE_SPEED
        + rng.random::<f32>() * OBSTACLE_SPEED_JITTER
        + difficulty * OBSTACLE_DIFFICULTY_SPEED;
    let speed = base * kind.profile().speed_factor * speed_multiplier;

    Obstacle::new(id, kind, Vec3::new(x, y, SPAWN_DEPTH), speed)
}

/// Build a projectile at the craft's nose
pub fn spawn_projectile(id: u32, craft: &Craft) -> Projectile {
    Projectile::new(id, craft.nose())
}

/// Spawn an obstacle if the cadence allows it; returns whether one was added
///
/// The interval is recomputed from the current difficulty every call.
pub fn spawn_obstacle_if_due(state: &mut GameState) -> bool {
    let interval = spawn_interval(state.difficulty, state.speed_multiplier);
    let now = state.run_clock;
    let due = state.last_spawn_at.is_none_or(|last| now - last > interval);
    if !due {
        return false;
    }

    let id = state.next_entity_id();
    let obstacle = spawn_obstacle(
        &mut state.rng,
        id,
        state.difficulty,
        state.speed_multiplier,
        state.viewport,
    );
    log::debug!(
        "Spawned {} #{} at ({:.1}, {:.1}) speed {:.1}",
        obstacle.kind().as_str(),
        obstacle.id,
        obstacle.pos.x,
        obstacle.pos.y,
        obstacle.speed
    );
    state.obstacles.push(obstacle);
    state.last_spawn_at = Some(now);
    true
}

/// Auto-fire from the craft, rate-limited by the tier's cooldown
pub fn fire_if_ready(state: &mut GameState) -> Option<u32> {
    let craft = state.craft.clone().filter(|c| c.alive)?;
    let now = state.run_clock;
    let cooldown = fire_cooldown(state.speed_multiplier);
    if state.last_fire_at.is_some_and(|last| now - last < cooldown) {
        return None;
    }

    let id = state.next_entity_id();
    state.projectiles.push(spawn_projectile(id, &craft));
    state.last_fire_at = Some(now);
    Some(id)
}
