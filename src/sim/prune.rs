//! Lifecycle pruning
//!
//! Drops entities that left the simulation volume or burned out. Runs after
//! collision removals have been applied.

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Remove out-of-bounds projectiles/obstacles and finished effects
///
/// Obstacles at or past the near bound are passes, never hits. Returns the
/// number of entities removed.
pub fn prune(state: &mut GameState) -> usize {
    let before = state.projectiles.len() + state.obstacles.len() + state.effects.len();

    state.projectiles.retain(|p| p.pos.z > PROJECTILE_FAR_BOUND);

    let events = &mut state.events;
    state.obstacles.retain(|o| {
        let inside = o.pos.z < OBSTACLE_NEAR_BOUND;
        if !inside {
            events.push(GameEvent::ObstaclePassed { id: o.id });
        }
        inside
    });

    prune_effects(state);

    before - (state.projectiles.len() + state.obstacles.len() + state.effects.len())
}

/// Remove effects whose life ran out
pub fn prune_effects(state: &mut GameState) {
    state.effects.retain(|e| e.life > 0.0);
}
