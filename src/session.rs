//! Game session: the surface a host drives
//!
//! Owns the simulation state, the player's settings and the high score store.
//! Presentation issues `start`/`restart`, the frame loop calls `tick`, and the
//! renderer reads `snapshot` after each tick.

use crate::highscores::HighScore;
use crate::persistence::HighScoreStore;
use crate::settings::{Settings, SpeedTier};
use crate::sim::{
    self, GameEvent, GameState, GameStatus, HudState, RenderSnapshot, SimError, TickInput,
};

/// Derive the next run seed (64-bit LCG step)
fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

pub struct Session<S: HighScoreStore> {
    state: GameState,
    settings: Settings,
    high_score: HighScore<S>,
    seed: u64,
}

impl<S: HighScoreStore> Session<S> {
    /// Open a session in the START status, reading the stored high score once
    pub fn new(seed: u64, settings: Settings, store: S) -> Self {
        let high_score = HighScore::load(store);
        let mut state = GameState::new(seed);
        state.high_score = high_score.best();
        state.hit_stop_enabled = settings.effective_hit_stop();
        Self {
            state,
            settings,
            high_score,
            seed,
        }
    }

    /// Start the first run at an explicit speed multiplier
    pub fn start(&mut self, speed_multiplier: f32) -> Result<(), SimError> {
        self.begin(speed_multiplier, sim::start)
    }

    /// Start the first run at a named tier
    pub fn start_tier(&mut self, tier: SpeedTier) -> Result<(), SimError> {
        self.start(tier.multiplier())
    }

    /// Start the first run at the tier from settings
    pub fn start_default(&mut self) -> Result<(), SimError> {
        self.start_tier(self.settings.speed_tier)
    }

    /// Leave GAMEOVER with a freshly chosen speed multiplier
    pub fn restart(&mut self, speed_multiplier: f32) -> Result<(), SimError> {
        self.begin(speed_multiplier, sim::restart)
    }

    /// Start or restart, whichever the current status allows
    pub fn launch(&mut self, tier: SpeedTier) -> Result<(), SimError> {
        match self.status() {
            GameStatus::GameOver => self.restart(tier.multiplier()),
            _ => self.start_tier(tier),
        }
    }

    fn begin(
        &mut self,
        speed_multiplier: f32,
        command: fn(&mut GameState, f32, u64) -> Result<(), SimError>,
    ) -> Result<(), SimError> {
        let seed = next_seed(self.seed);
        self.state.high_score = self.high_score.best();
        self.state.hit_stop_enabled = self.settings.effective_hit_stop();
        command(&mut self.state, speed_multiplier, seed)?;
        self.seed = seed;
        Ok(())
    }

    /// Advance one frame and return what happened
    ///
    /// New high scores are written through to the store here.
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        sim::tick(&mut self.state, input);
        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::NewHighScore { score } = event {
                if self.high_score.submit(*score) {
                    log::info!("New high score {}", score);
                }
            }
        }
        events
    }

    pub fn hud(&self) -> HudState {
        HudState::capture(&self.state)
    }

    /// Render view with player preferences applied
    pub fn snapshot(&self) -> RenderSnapshot {
        let mut snapshot = RenderSnapshot::capture(&self.state);
        if !self.settings.effective_screen_shake() {
            snapshot.camera_shake = 0.0;
        }
        snapshot
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.state.hit_stop_enabled = settings.effective_hit_stop();
        self.settings = settings;
    }

    pub fn store(&self) -> &S {
        self.high_score.store()
    }
}
