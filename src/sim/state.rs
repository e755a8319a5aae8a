//! Game session state and core simulation types
//!
//! One `GameState` owns everything a running game mutates. Every operation
//! takes it explicitly; there is no ambient state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::block::Block;
use super::effects::{EffectKind, Effects, Polarity};
use super::layout::Layout;
use super::paddle::Paddle;
use super::particle::Particle;
use crate::consts::*;
use crate::data::{DataSource, SourceRecord};
use crate::messages::{self, MessagePool};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for `start_game`
    Start,
    Playing,
    Paused,
    /// All blocks cleared, waiting for the next-level action
    LevelComplete,
    GameOver,
    Win,
    /// Torn down; the frame loop must not continue
    Stopped,
}

impl GamePhase {
    /// Whether the host should request another animation frame
    pub fn keeps_frame_loop_alive(self) -> bool {
        self != GamePhase::Stopped
    }
}

/// How prominent a notification is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Things that happened during a tick or session call, for sound and UI
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    WallBounce,
    PaddleHit,
    BlockHit { block_id: u32 },
    BlockDestroyed { block_id: u32, score: u64 },
    LifeLost { lives_left: u32 },
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Play the celebration for `celebration_ms`, then show the level screen
    LevelComplete { level: u32, celebration_ms: f64 },
    EffectActivated { kind: EffectKind, polarity: Polarity },
    EffectExpired { kind: EffectKind },
    RandomEvent { block_id: u32 },
    Notify {
        message: String,
        severity: Severity,
        duration_ms: u32,
    },
}

/// Read-only view for the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub phase: GamePhase,
    pub data_source: DataSource,
}

/// Ball state saved across a pause
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedMotion {
    pub ball_id: u32,
    pub vel: Vec2,
    pub speed: f32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub data_source: DataSource,
    pub schedule_records: Vec<SourceRecord>,
    pub board_records: Vec<SourceRecord>,
    /// Active blocks plus destroyed ones still fading out
    pub blocks: Vec<Block>,
    /// Live balls, oldest first
    pub balls: Vec<Ball>,
    pub paddle: Paddle,
    pub effects: Effects,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    /// Level 1 speed; set by difficulty
    pub base_speed: f32,
    /// Current level speed before any shrink effect
    pub ball_speed: f32,
    pub width: f32,
    pub height: f32,
    pub random_blocks_enabled: bool,
    pub power_ups_enabled: bool,

    // Frame timing
    pub last_frame_time: Option<f64>,
    /// Leave velocities untouched on the next frame
    pub skip_normalization: bool,

    // Pause bookkeeping
    /// Paused because the pointer left the playfield
    pub auto_paused: bool,
    pub paused_at: Option<f64>,
    pub saved_motion: Vec<SavedMotion>,

    /// Gate for random events
    pub last_event_time: f64,
    /// Pending transition to `Win`
    pub win_at: Option<f64>,
    /// `proceed_to_next_level` already bumped the level
    pub level_advanced: bool,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let width = tuning.playfield_width;
        let height = tuning.playfield_height;
        let base_speed = tuning.base_ball_speed;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            score: 0,
            lives: tuning.starting_lives,
            level: 1,
            data_source: DataSource::default(),
            schedule_records: Vec::new(),
            board_records: Vec::new(),
            blocks: Vec::new(),
            balls: Vec::new(),
            paddle: Paddle::new(width, height),
            effects: Effects::default(),
            particles: Vec::new(),
            events: Vec::new(),
            base_speed,
            ball_speed: base_speed,
            width,
            height,
            random_blocks_enabled: true,
            power_ups_enabled: true,
            last_frame_time: None,
            skip_normalization: false,
            auto_paused: false,
            paused_at: None,
            saved_motion: Vec::new(),
            last_event_time: 0.0,
            win_at: None,
            level_advanced: false,
            next_id: 1,
            tuning,
        };

        state.regenerate_blocks(0.0);
        state.reset_balls();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn layout(&self) -> Layout {
        Layout::for_source(self.data_source, self.width, self.height)
    }

    pub fn records(&self, source: DataSource) -> &[SourceRecord] {
        match source {
            DataSource::Schedule => &self.schedule_records,
            DataSource::Board => &self.board_records,
        }
    }

    /// Replace the records for `source`. A failed fetch (`None`) keeps the
    /// grid playable with placeholders.
    pub fn set_records(&mut self, source: DataSource, records: Option<Vec<SourceRecord>>) {
        let records = records.unwrap_or_else(|| {
            log::warn!("No {:?} data available, using placeholder blocks", source);
            Vec::new()
        });
        match source {
            DataSource::Schedule => self.schedule_records = records,
            DataSource::Board => self.board_records = records,
        }
    }

    /// Blocks that still need to be destroyed
    pub fn active_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_active()).count()
    }

    /// Build this level's grid from the current source's records
    pub fn regenerate_blocks(&mut self, now: f64) {
        let layout = self.layout();
        let records = match self.data_source {
            DataSource::Schedule => &self.schedule_records,
            DataSource::Board => &self.board_records,
        };
        let mut blocks = layout.generate(records, self.level, &mut self.rng);
        for block in &mut blocks {
            block.id = self.next_entity_id();
            block.spawn_time = now;
        }
        self.blocks = blocks;
    }

    /// Ball speed with the shrink effect applied, if active
    pub fn effective_ball_speed(&self) -> f32 {
        if self.effects.is_active(EffectKind::ShrinkBall) {
            self.ball_speed * self.tuning.shrink_speed_factor
        } else {
            self.ball_speed
        }
    }

    /// Where an unlaunched ball sits: centered just above the paddle
    pub fn serve_position(&self) -> Vec2 {
        Vec2::new(self.paddle.center_x(), self.paddle.y - BALL_SERVE_GAP)
    }

    /// Replace all balls with a single unlaunched one on the paddle
    pub fn reset_balls(&mut self) {
        self.balls.clear();
        let id = self.next_entity_id();
        let ball = Ball::new(id, self.serve_position(), self.effective_ball_speed());
        self.balls.push(ball);
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!("Phase {:?} -> {:?}", from, to);
        self.phase = to;
        self.emit(GameEvent::PhaseChanged { from, to });
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Queue a notification with a random line from `pool`
    pub fn notify_from_pool(&mut self, pool: MessagePool, severity: Severity) {
        let message = messages::pick(&mut self.rng, pool, self.data_source).to_string();
        self.notify(message, severity);
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.emit(GameEvent::Notify {
            message: message.into(),
            severity,
            duration_ms: self.tuning.notification_ms,
        });
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            score: self.score,
            level: self.level,
            lives: self.lives,
            phase: self.phase,
            data_source: self.data_source,
        }
    }
}
