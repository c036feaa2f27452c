//! Game state and core simulation types
//!
//! Every store the tick mutates lives on `GameState`, including the transient
//! feel signals (time-scale, camera shake) and the fire/spawn timers.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for the player to pick a speed tier
    Start,
    /// Active run
    Playing,
    /// Run ended; only an explicit restart leaves this state
    GameOver,
}

/// Static per-kind obstacle data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleProfile {
    /// Relative spawn weight
    pub weight: u32,
    pub points: u64,
    /// Multiplier on the rolled obstacle speed
    pub speed_factor: f32,
    pub hit_radius: f32,
    /// 0xRRGGBB
    pub color: u32,
    /// Destruction produces a mega explosion
    pub mega: bool,
    /// Hit-stop strength (time-scale drops to `1 - severity`)
    pub severity: f32,
    /// Camera shake magnitude on destruction
    pub shake: f32,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Scout,
    Stinger,
    Interceptor,
    Ghost,
    Goliath,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Scout,
        ObstacleKind::Stinger,
        ObstacleKind::Interceptor,
        ObstacleKind::Ghost,
        ObstacleKind::Goliath,
    ];

    pub fn profile(self) -> &'static ObstacleProfile {
        match self {
            ObstacleKind::Scout => &ObstacleProfile {
                weight: 45,
                points: 150,
                speed_factor: 1.0,
                hit_radius: 2.0,
                color: 0xff0044,
                mega: false,
                severity: 0.15,
                shake: 0.35,
            },
            ObstacleKind::Stinger => &ObstacleProfile {
                weight: 25,
                points: 250,
                speed_factor: 1.35,
                hit_radius: 1.6,
                color: 0xff8800,
                mega: false,
                severity: 0.2,
                shake: 0.4,
            },
            ObstacleKind::Interceptor => &ObstacleProfile {
                weight: 15,
                points: 400,
                speed_factor: 1.7,
                hit_radius: 1.5,
                color: 0xffee00,
                mega: false,
                severity: 0.3,
                shake: 0.5,
            },
            ObstacleKind::Ghost => &ObstacleProfile {
                weight: 10,
                points: 600,
                speed_factor: 0.8,
                hit_radius: 1.8,
                color: 0xaa66ff,
                mega: false,
                severity: 0.35,
                shake: 0.55,
            },
            ObstacleKind::Goliath => &ObstacleProfile {
                weight: 5,
                points: 1000,
                speed_factor: 0.55,
                hit_radius: 3.2,
                color: 0x00ffaa,
                mega: true,
                severity: 0.6,
                shake: 1.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Scout => "SCOUT",
            ObstacleKind::Stinger => "STINGER",
            ObstacleKind::Interceptor => "INTERCEPTOR",
            ObstacleKind::Ghost => "GHOST",
            ObstacleKind::Goliath => "GOLIATH",
        }
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub pos: Vec3,
    /// Bank (roll) angle proxy
    pub bank: f32,
    /// Pitch angle proxy
    pub pitch: f32,
    /// Run-clock time until which obstacle contact is ignored
    pub invulnerable_until: f32,
    pub alive: bool,
}

impl Default for Craft {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, CRAFT_Y_OFFSET, 0.0),
            bank: 0.0,
            pitch: 0.0,
            invulnerable_until: 0.0,
            alive: true,
        }
    }
}

impl Craft {
    pub fn is_invulnerable(&self, now: f32) -> bool {
        now < self.invulnerable_until
    }

    /// Where projectiles leave the craft
    pub fn nose(&self) -> Vec3 {
        self.pos - Vec3::Z * PROJECTILE_NOSE_OFFSET
    }
}

/// A player-fired projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec3,
    /// Depth at the start of the last integration step (swept collision)
    pub prev_z: f32,
    pub vel: Vec3,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            prev_z: pos.z,
            vel: Vec3::new(0.0, 0.0, -PROJECTILE_SPEED),
        }
    }
}

/// A hostile obstacle
///
/// Points, color and hit radius are derived from `kind` and cannot drift
/// from it after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec3,
    /// Depth at the start of the last integration step (swept collision)
    pub prev_z: f32,
    /// Forward (+z) speed in units/s
    pub speed: f32,
    kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec3, speed: f32) -> Self {
        Self {
            id,
            pos,
            prev_z: pos.z,
            speed,
            kind,
        }
    }

    #[inline]
    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    #[inline]
    pub fn points(&self) -> u64 {
        self.kind.profile().points
    }

    #[inline]
    pub fn hit_radius(&self) -> f32 {
        self.kind.profile().hit_radius
    }

    #[inline]
    pub fn color(&self) -> u32 {
        self.kind.profile().color
    }
}

/// A single explosion particle, relative to its effect's origin
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub offset: Vec3,
    pub vel: Vec3,
}

/// An explosion (particle burst)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub id: u32,
    pub origin: Vec3,
    /// 1.0 at creation, removed at 0
    pub life: f32,
    pub color: u32,
    pub is_mega: bool,
    pub particles: Vec<Particle>,
}

impl Effect {
    /// Life lost per second
    pub fn decay_rate(&self) -> f32 {
        if self.is_mega {
            MEGA_EFFECT_DECAY
        } else {
            EFFECT_DECAY
        }
    }
}

/// Viewport size in world units, supplied by the render collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Visible extent at the craft plane for a canvas of the given aspect ratio
    pub fn from_aspect(aspect: f32) -> Self {
        let height = 2.0 * CAMERA_DISTANCE * (CAMERA_FOV_Y_DEG.to_radians() / 2.0).tan();
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            16.0 / 9.0
        };
        Self {
            width: height * aspect,
            height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_aspect(16.0 / 9.0)
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { speed_multiplier: f32 },
    ObstacleDestroyed { id: u32, kind: ObstacleKind, points: u64 },
    /// Obstacle crossed the near plane without contact
    ObstaclePassed { id: u32 },
    CraftHit { obstacle_id: u32, lives: u8 },
    NewHighScore { score: u64 },
    GameOver { score: u64 },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed of the current run
    pub seed: u64,
    /// Spawn/effect randomness; reseeded per run
    pub rng: Pcg32,
    pub status: GameStatus,
    /// Speed tier multiplier chosen at start
    pub speed_multiplier: f32,
    pub lives: u8,
    pub score: u64,
    /// Best score known to the simulation (loaded from persistence by the host)
    pub high_score: u64,
    /// Host clock value the current run started at (set on its first tick)
    pub run_started_at: Option<f64>,
    /// Seconds since the run started
    pub run_clock: f32,
    pub difficulty: f32,
    /// Hit-stop multiplier on integration, recovers toward 1.0
    pub time_scale: f32,
    /// Camera shake magnitude for the renderer
    pub camera_shake: f32,
    /// Disabled by reduced-motion preferences
    pub hit_stop_enabled: bool,
    /// Run-clock time of the last obstacle spawn
    pub last_spawn_at: Option<f32>,
    /// Run-clock time of the last shot
    pub last_fire_at: Option<f32>,
    pub viewport: Viewport,
    /// Absent until a run starts
    pub craft: Option<Craft>,
    pub projectiles: Vec<Projectile>,
    pub obstacles: Vec<Obstacle>,
    pub effects: Vec<Effect>,
    /// Events since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID (shared by all stores)
    next_id: u32,
}

impl GameState {
    /// Create a new game state in the START status
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            status: GameStatus::Start,
            speed_multiplier: 1.0,
            lives: START_LIVES,
            score: 0,
            high_score: 0,
            run_started_at: None,
            run_clock: 0.0,
            difficulty: 0.0,
            time_scale: 1.0,
            camera_shake: 0.0,
            hit_stop_enabled: true,
            last_spawn_at: None,
            last_fire_at: None,
            viewport: Viewport::default(),
            craft: None,
            projectiles: Vec::new(),
            obstacles: Vec::new(),
            effects: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset everything a run owns; keeps high score, viewport and preferences
    pub(crate) fn reset_run(&mut self, seed: u64, speed_multiplier: f32) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.status = GameStatus::Playing;
        self.speed_multiplier = speed_multiplier;
        self.lives = START_LIVES;
        self.score = 0;
        self.run_started_at = None;
        self.run_clock = 0.0;
        self.difficulty = 0.0;
        self.time_scale = 1.0;
        self.camera_shake = 0.0;
        self.last_spawn_at = None;
        self.last_fire_at = None;
        self.craft = Some(Craft::default());
        self.projectiles.clear();
        self.obstacles.clear();
        self.effects.clear();
        self.next_id = 1;
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
