//! Collision detection and response
//!
//! Two phases: `detect` reads an immutable view of the stores and returns
//! every hit pair, then `apply` performs all removals and insertions in one
//! batch. Nothing is filtered while it is being iterated.
//!
//! Projectiles and obstacles only move along z, so the test is swept along
//! depth: a pair that crossed during the step counts as touching even if the
//! step carried them past each other.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use rand::Rng;

use super::state::{
    Craft, Effect, GameState, Obstacle, ObstacleKind, Particle, Projectile,
};
use crate::consts::*;

/// A projectile destroying an obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub projectile_id: u32,
    pub obstacle_id: u32,
    pub kind: ObstacleKind,
    pub points: u64,
    /// Obstacle position at the moment of the hit
    pub position: Vec3,
}

/// An obstacle striking the craft
#[derive(Debug, Clone, PartialEq)]
pub struct CraftContact {
    pub obstacle_id: u32,
    pub kind: ObstacleKind,
    pub position: Vec3,
}

/// Everything that collided this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub kills: Vec<Kill>,
    pub craft_hits: Vec<CraftContact>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.kills.is_empty() && self.craft_hits.is_empty()
    }

    pub fn score_delta(&self) -> u64 {
        self.kills.iter().map(|k| k.points).sum()
    }

    pub fn craft_hit(&self) -> bool {
        !self.craft_hits.is_empty()
    }

    pub fn destroyed_obstacle_ids(&self) -> HashSet<u32> {
        self.kills
            .iter()
            .map(|k| k.obstacle_id)
            .chain(self.craft_hits.iter().map(|c| c.obstacle_id))
            .collect()
    }

    pub fn destroyed_projectile_ids(&self) -> HashSet<u32> {
        self.kills.iter().map(|k| k.projectile_id).collect()
    }
}

/// Squared distance at the closest approach along z during the last step
///
/// Lateral offsets are fixed for the step; only the depth gap changes, and it
/// changes linearly, so the minimum is either zero (the gap changed sign) or
/// the smaller endpoint.
#[inline]
pub fn swept_distance_sq(a: Vec3, a_prev_z: f32, b: Vec3, b_prev_z: f32) -> f32 {
    let lateral = Vec2::new(a.x - b.x, a.y - b.y).length_squared();
    let gap_before = a_prev_z - b_prev_z;
    let gap_after = a.z - b.z;
    let dz = if gap_before * gap_after <= 0.0 {
        0.0
    } else {
        gap_before.abs().min(gap_after.abs())
    };
    lateral + dz * dz
}

#[inline]
fn projectile_hits(projectile: &Projectile, obstacle: &Obstacle) -> bool {
    let r = obstacle.hit_radius();
    swept_distance_sq(projectile.pos, projectile.prev_z, obstacle.pos, obstacle.prev_z) < r * r
}

#[inline]
fn craft_touches(craft: &Craft, obstacle: &Obstacle) -> bool {
    swept_distance_sq(craft.pos, craft.pos.z, obstacle.pos, obstacle.prev_z)
        < CRAFT_HIT_RADIUS * CRAFT_HIT_RADIUS
}

/// Find every hit pair for this tick without mutating anything
///
/// Pairs are visited in store order. A projectile may destroy several
/// obstacles in the same tick; an obstacle is destroyed at most once. The
/// craft is skipped entirely while invulnerable, otherwise every overlapping
/// obstacle that survived the projectiles counts as a separate hit.
pub fn detect(
    projectiles: &[Projectile],
    obstacles: &[Obstacle],
    craft: Option<&Craft>,
    now: f32,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let mut destroyed: HashSet<u32> = HashSet::new();

    for projectile in projectiles {
        for obstacle in obstacles {
            if destroyed.contains(&obstacle.id) {
                continue;
            }
            if projectile_hits(projectile, obstacle) {
                destroyed.insert(obstacle.id);
                report.kills.push(Kill {
                    projectile_id: projectile.id,
                    obstacle_id: obstacle.id,
                    kind: obstacle.kind(),
                    points: obstacle.points(),
                    position: obstacle.pos,
                });
            }
        }
    }

    if let Some(craft) = craft.filter(|c| c.alive && !c.is_invulnerable(now)) {
        for obstacle in obstacles {
            if destroyed.contains(&obstacle.id) {
                continue;
            }
            if craft_touches(craft, obstacle) {
                destroyed.insert(obstacle.id);
                report.craft_hits.push(CraftContact {
                    obstacle_id: obstacle.id,
                    kind: obstacle.kind(),
                    position: obstacle.pos,
                });
            }
        }
    }

    report
}

/// Build an explosion at `origin`
pub fn explosion<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    origin: Vec3,
    color: u32,
    is_mega: bool,
) -> Effect {
    let (count, spread) = if is_mega {
        (MEGA_EFFECT_PARTICLES, MEGA_EFFECT_SPREAD)
    } else {
        (EFFECT_PARTICLES, EFFECT_SPREAD)
    };
    let particles = (0..count)
        .map(|_| Particle {
            offset: Vec3::ZERO,
            vel: Vec3::new(
                (rng.random::<f32>() - 0.5) * 2.0 * spread,
                (rng.random::<f32>() - 0.5) * 2.0 * spread,
                (rng.random::<f32>() - 0.5) * 2.0 * spread,
            ),
        })
        .collect();

    Effect {
        id,
        origin,
        life: 1.0,
        color,
        is_mega,
        particles,
    }
}

/// Slow time down for a hit of the given severity
fn hit_stop(state: &mut GameState, severity: f32) {
    if state.hit_stop_enabled {
        state.time_scale = state.time_scale.min(1.0 - severity).max(MIN_TIME_SCALE);
    }
}

fn shake(state: &mut GameState, magnitude: f32) {
    state.camera_shake = state.camera_shake.max(magnitude).min(1.0);
}

/// Apply a detection report: removals, explosions, hit-stop, shake and
/// invulnerability. Score and lives are left to the difficulty controller.
pub fn apply(state: &mut GameState, report: &CollisionReport) {
    if report.is_empty() {
        return;
    }

    let dead_obstacles = report.destroyed_obstacle_ids();
    let dead_projectiles = report.destroyed_projectile_ids();
    state.obstacles.retain(|o| !dead_obstacles.contains(&o.id));
    state.projectiles.retain(|p| !dead_projectiles.contains(&p.id));

    for kill in &report.kills {
        let profile = kill.kind.profile();
        let id = state.next_entity_id();
        let effect = explosion(&mut state.rng, id, kill.position, profile.color, profile.mega);
        state.effects.push(effect);
        hit_stop(state, profile.severity);
        shake(state, profile.shake);
        log::debug!(
            "Projectile #{} destroyed {} #{} (+{})",
            kill.projectile_id,
            kill.kind.as_str(),
            kill.obstacle_id,
            kill.points
        );
    }

    if report.craft_hit() {
        for contact in &report.craft_hits {
            let profile = contact.kind.profile();
            let id = state.next_entity_id();
            let effect = explosion(&mut state.rng, id, contact.position, profile.color, profile.mega);
            state.effects.push(effect);
        }
        let now = state.run_clock;
        if let Some(craft) = state.craft.as_mut() {
            craft.invulnerable_until = now + INVULNERABILITY_SECS;
        }
        hit_stop(state, CRAFT_HIT_SEVERITY);
        shake(state, CRAFT_HIT_SHAKE);
    }
}

/// Detect and apply in one call; returns what happened
pub fn resolve(state: &mut GameState) -> CollisionReport {
    let report = detect(
        &state.projectiles,
        &state.obstacles,
        state.craft.as_ref(),
        state.run_clock,
    );
    apply(state, &report);
    report
}
