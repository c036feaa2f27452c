//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, driven by the host's delta and clock
//! - Seeded RNG only
//! - Stable iteration order (stores stay in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod integrate;
pub mod prune;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, CraftContact, Kill, detect, resolve};
pub use difficulty::{difficulty_for, fire_cooldown, spawn_interval};
pub use snapshot::{HudState, RenderSnapshot};
pub use state::{
    Craft, Effect, GameEvent, GameState, GameStatus, Obstacle, ObstacleKind, ObstacleProfile,
    Particle, Projectile, Viewport,
};
pub use tick::{SimError, TickInput, restart, start, tick};
