//! Motion integration and craft control
//!
//! Entities move along fixed velocities scaled by the hit-stop time-scale.
//! The craft is not integrated: it chases a pointer-derived target with
//! frame-rate-independent smoothing.

use glam::{Vec2, Vec3};

use super::state::{Craft, GameState, Viewport};
use crate::consts::*;
use crate::{damp, lerp};

/// Pointer target in world space (before clamping)
pub fn pointer_target(pointer: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        pointer.x * viewport.width / 2.0,
        pointer.y * viewport.height / 2.0 + CRAFT_Y_OFFSET,
    )
}

/// Clamp a target into the craft's movement envelope
pub fn clamp_to_envelope(target: Vec2, viewport: Viewport) -> Vec2 {
    let bound_x = (viewport.width / 2.0 - CRAFT_X_MARGIN).max(0.0);
    let top = viewport.height + CRAFT_Y_TOP_MARGIN;
    Vec2::new(
        target.x.clamp(-bound_x, bound_x),
        target.y.clamp(CRAFT_Y_BOTTOM, top),
    )
}

/// Move the craft toward the pointer and update bank/pitch
///
/// `pointer` is normalized to [-1, 1] on both axes; out-of-range samples are
/// clamped.
pub fn steer_craft(craft: &mut Craft, pointer: Vec2, viewport: Viewport, dt: f32) {
    let pointer = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
    let target = pointer_target(pointer, viewport);
    let clamped = clamp_to_envelope(target, viewport);

    let follow = damp(CRAFT_FOLLOW, dt);
    craft.pos.x = lerp(craft.pos.x, clamped.x, follow);
    craft.pos.y = lerp(craft.pos.y, clamped.y, follow);

    // Tilt follows the unclamped target so the craft leans into the edge
    let bank_target = -(craft.pos.x - target.x) * CRAFT_BANK_GAIN;
    let pitch_target = (craft.pos.y - target.y) * CRAFT_PITCH_GAIN;
    let tilt = damp(CRAFT_TILT_FOLLOW, dt);
    craft.bank = lerp(craft.bank, bank_target, tilt);
    craft.pitch = lerp(craft.pitch, pitch_target, tilt);
}

/// Advance projectiles, obstacles and effects by `dt * time_scale`
pub fn advance_entities(state: &mut GameState, dt: f32) {
    let dt = dt * state.time_scale;

    for projectile in state.projectiles.iter_mut() {
        projectile.prev_z = projectile.pos.z;
        projectile.pos += projectile.vel * dt;
    }

    for obstacle in state.obstacles.iter_mut() {
        obstacle.prev_z = obstacle.pos.z;
        obstacle.pos += Vec3::Z * obstacle.speed * dt;
    }

    advance_effects(state, dt);
}

/// Animate explosions; runs in every status so bursts finish after game over
pub fn advance_effects(state: &mut GameState, dt: f32) {
    for effect in state.effects.iter_mut() {
        for particle in effect.particles.iter_mut() {
            particle.offset += particle.vel * dt;
        }
        effect.life -= effect.decay_rate() * dt;
    }
}

/// Relax hit-stop toward 1.0 and decay camera shake
pub fn recover_feel(state: &mut GameState, dt: f32) {
    let t = 1.0 - (-TIME_SCALE_RECOVERY * dt).exp();
    state.time_scale = lerp(state.time_scale, 1.0, t).clamp(MIN_TIME_SCALE, 1.0);
    if 1.0 - state.time_scale < 1e-3 {
        state.time_scale = 1.0;
    }

    state.camera_shake *= SHAKE_DECAY_PER_FRAME.powf(dt * REFERENCE_FPS);
    if state.camera_shake < SHAKE_CUTOFF {
        state.camera_shake = 0.0;
    }
}
