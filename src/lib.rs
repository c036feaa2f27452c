//! Neon Sky Ace - A tunnel arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, scoring)
//! - `session`: Host-facing game session (start/restart, high score write-through)
//! - `persistence`: High score storage backends
//! - `settings`: Player preferences

pub mod highscores;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScore;
pub use session::Session;
pub use settings::{Settings, SpeedTier};

/// Game configuration constants
///
/// Rates tuned per 60 Hz frame are converted to
/// per-second values here so the simulation is frame-rate independent.
pub mod consts {
    /// Camera sits this far behind the craft plane
    pub const CAMERA_DISTANCE: f32 = 12.0;
    /// Vertical field of view (degrees)
    pub const CAMERA_FOV_Y_DEG: f32 = 60.0;

    /// Reference frame rate the smoothing factors were tuned at
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest frame delta the tick will integrate (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Lives at the start of a run
    pub const START_LIVES: u8 = 3;

    /// Difficulty ramps by 1.0 every this many seconds
    pub const DIFFICULTY_RAMP_SECS: f32 = 60.0;
    /// Difficulty cap (before the speed multiplier is applied)
    pub const DIFFICULTY_CAP: f32 = 5.0;

    /// Obstacle spawn cadence (seconds)
    pub const SPAWN_INTERVAL_BASE: f32 = 0.8;
    pub const SPAWN_INTERVAL_DECAY: f32 = 0.2;
    pub const SPAWN_INTERVAL_FLOOR: f32 = 0.3;

    /// Obstacle spawn placement
    pub const SPAWN_DEPTH: f32 = -60.0;
    pub const SPAWN_WIDTH_FACTOR: f32 = 1.5;
    pub const SPAWN_Y_OFFSET: f32 = 1.5;
    /// Obstacles never spawn above this fraction of the viewport height (HUD band)
    pub const SPAWN_CEILING_FRACTION: f32 = 0.4;

    /// Obstacle speed (units/s): base + jitter + difficulty term
    pub const OBSTACLE_BASE_SPEED: f32 = 30.0;
    pub const OBSTACLE_SPEED_JITTER: f32 = 12.0;
    pub const OBSTACLE_DIFFICULTY_SPEED: f32 = 4.8;

    /// Auto-fire
    pub const FIRE_COOLDOWN: f32 = 0.11;
    pub const PROJECTILE_NOSE_OFFSET: f32 = 1.3;
    pub const PROJECTILE_SPEED: f32 = 120.0;

    /// Simulation volume (depth)
    pub const PROJECTILE_FAR_BOUND: f32 = -70.0;
    pub const OBSTACLE_NEAR_BOUND: f32 = 20.0;

    /// Craft control envelope
    pub const CRAFT_Y_OFFSET: f32 = 1.5;
    pub const CRAFT_X_MARGIN: f32 = 0.8;
    pub const CRAFT_Y_TOP_MARGIN: f32 = 0.5;
    pub const CRAFT_Y_BOTTOM: f32 = -1.2;
    /// Position smoothing per reference frame
    pub const CRAFT_FOLLOW: f32 = 0.18;
    /// Bank/pitch smoothing per reference frame
    pub const CRAFT_TILT_FOLLOW: f32 = 0.1;
    pub const CRAFT_BANK_GAIN: f32 = 0.6;
    pub const CRAFT_PITCH_GAIN: f32 = 0.4;
    pub const CRAFT_HIT_RADIUS: f32 = 1.1;
    pub const INVULNERABILITY_SECS: f32 = 1.5;

    /// Explosion effects
    pub const EFFECT_PARTICLES: usize = 8;
    pub const EFFECT_SPREAD: f32 = 4.0;
    pub const EFFECT_DECAY: f32 = 2.0;
    pub const MEGA_EFFECT_PARTICLES: usize = 32;
    pub const MEGA_EFFECT_SPREAD: f32 = 12.0;
    pub const MEGA_EFFECT_DECAY: f32 = 0.8;

    /// Hit-stop
    pub const MIN_TIME_SCALE: f32 = 0.05;
    pub const TIME_SCALE_RECOVERY: f32 = 6.0;
    pub const CRAFT_HIT_SEVERITY: f32 = 0.5;

    /// Camera shake
    pub const SHAKE_DECAY_PER_FRAME: f32 = 0.85;
    pub const SHAKE_CUTOFF: f32 = 0.01;
    pub const CRAFT_HIT_SHAKE: f32 = 0.8;
}

/// Linear interpolation
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Blend factor that reproduces a per-frame lerp `factor` at any `dt`
///
/// `1 - (1 - factor)^(dt * 60)`: exponential approach, not a fixed increment.
#[inline]
pub fn damp(factor: f32, dt: f32) -> f32 {
    1.0 - (1.0 - factor).powf(dt * consts::REFERENCE_FPS)
}
