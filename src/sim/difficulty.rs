//! Difficulty and score bookkeeping
//!
//! Difficulty is a pure function of run time and the speed tier. Score, lives
//! and the running high score change only through `apply_report`.

use super::collision::CollisionReport;
use super::state::{GameEvent, GameState, GameStatus};
use crate::consts::*;

/// Difficulty scalar: `min(t / 60, cap) * speed_multiplier`
pub fn difficulty_for(run_secs: f32, speed_multiplier: f32) -> f32 {
    (run_secs.max(0.0) / DIFFICULTY_RAMP_SECS).min(DIFFICULTY_CAP) * speed_multiplier
}

/// Seconds between obstacle spawns, floor-clamped
pub fn spawn_interval(difficulty: f32, speed_multiplier: f32) -> f32 {
    (SPAWN_INTERVAL_BASE / speed_multiplier - difficulty * SPAWN_INTERVAL_DECAY)
        .max(SPAWN_INTERVAL_FLOOR)
}

/// Seconds between shots
pub fn fire_cooldown(speed_multiplier: f32) -> f32 {
    FIRE_COOLDOWN / speed_multiplier
}

/// Recompute difficulty from the run clock; never lets it fall
pub fn update_difficulty(state: &mut GameState) {
    let next = difficulty_for(state.run_clock, state.speed_multiplier);
    state.difficulty = state.difficulty.max(next);
}

/// Fold a tick's collision outcome into score, lives and status
pub fn apply_report(state: &mut GameState, report: &CollisionReport) {
    if state.status != GameStatus::Playing {
        return;
    }

    for kill in &report.kills {
        state.score += kill.points;
        state.events.push(GameEvent::ObstacleDestroyed {
            id: kill.obstacle_id,
            kind: kill.kind,
            points: kill.points,
        });
    }

    if state.score > state.high_score {
        state.high_score = state.score;
        state.events.push(GameEvent::NewHighScore { score: state.score });
    }

    // One life per contact, even when several land in the same tick
    for contact in &report.craft_hits {
        let obstacle_id = contact.obstacle_id;
        state.lives = state.lives.saturating_sub(1);
        state.events.push(GameEvent::CraftHit {
            obstacle_id,
            lives: state.lives,
        });
        log::info!("Craft hit by #{}, {} lives left", obstacle_id, state.lives);
    }

    if state.lives == 0 {
        state.status = GameStatus::GameOver;
        if let Some(craft) = state.craft.as_mut() {
            craft.alive = false;
        }
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!(
            "Game over: score {} (best {}) after {:.1}s",
            state.score,
            state.high_score,
            state.run_clock
        );
    }
}
