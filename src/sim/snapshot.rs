//! Read-only views handed to the render and presentation collaborators
//!
//! Built after a tick completes; nothing here can write back into the
//! simulation.

use glam::Vec3;
use serde::Serialize;

use super::state::{GameState, GameStatus, ObstacleKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CraftPose {
    pub pos: Vec3,
    pub bank: f32,
    pub pitch: f32,
    /// True while the craft should blink
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub pos: Vec3,
    pub kind: ObstacleKind,
    pub color: u32,
    pub hit_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectView {
    pub id: u32,
    pub color: u32,
    pub is_mega: bool,
    /// Drives particle scale and opacity
    pub life: f32,
    /// World-space particle positions
    pub particles: Vec<Vec3>,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub craft: Option<CraftPose>,
    pub projectiles: Vec<ProjectileView>,
    pub obstacles: Vec<ObstacleView>,
    pub effects: Vec<EffectView>,
    pub camera_shake: f32,
    pub time_scale: f32,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let now = state.run_clock;
        Self {
            craft: state.craft.as_ref().filter(|c| c.alive).map(|c| CraftPose {
                pos: c.pos,
                bank: c.bank,
                pitch: c.pitch,
                invulnerable: c.is_invulnerable(now),
            }),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView { id: p.id, pos: p.pos })
                .collect(),
            obstacles: state
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    pos: o.pos,
                    kind: o.kind(),
                    color: o.color(),
                    hit_radius: o.hit_radius(),
                })
                .collect(),
            effects: state
                .effects
                .iter()
                .map(|e| EffectView {
                    id: e.id,
                    color: e.color,
                    is_mega: e.is_mega,
                    life: e.life.clamp(0.0, 1.0),
                    particles: e.particles.iter().map(|p| e.origin + p.offset).collect(),
                })
                .collect(),
            camera_shake: state.camera_shake,
            time_scale: state.time_scale,
        }
    }
}

/// Score readout for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HudState {
    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    pub status: GameStatus,
}

impl HudState {
    pub fn capture(state: &GameState) -> Self {
        Self {
            score: state.score,
            high_score: state.high_score,
            lives: state.lives,
            status: state.status,
        }
    }
}
