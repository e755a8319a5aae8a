//! Agenda Breaker - a block-breaker whose levels are your week
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, entities, layout, power-ups, game loop)
//! - `platform`: Browser/native abstraction (clock, input sampling, storage, notifications)
//! - `tuning`: Data-driven game balance
//! - `settings`: Persisted player toggles and difficulty presets
//! - `data`: Meeting/task records and mock providers

pub mod data;
pub mod messages;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use data::{DataProvider, MockProvider, SourceRecord};
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Reference frame length; velocities are expressed in pixels per reference frame
    pub const FRAME_MS: f32 = 16.67;
    /// Largest time multiplier a single frame may apply (absorbs tab-switch gaps)
    pub const MAX_FRAME_MULTIPLIER: f32 = 2.0;
    /// Maximum substeps per frame
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Distance from the playfield bottom to the paddle top
    pub const PADDLE_BOTTOM_OFFSET: f32 = 30.0;
    /// Keyboard nudge per reference frame
    pub const PADDLE_SPEED: f32 = 8.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Serving ball sits this far above the paddle top
    pub const BALL_SERVE_GAP: f32 = 20.0;
    pub const BASE_BALL_SPEED: f32 = 8.0;
    pub const MIN_BALL_SPEED: f32 = 1.0;
    pub const MAX_BALL_SPEED: f32 = 20.0;
    pub const TRAIL_LENGTH: usize = 10;
    /// Paddle bounce is limited to ±60° from straight up
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

    /// Shared layout metrics
    pub const COLUMN_PADDING: f32 = 5.0;
    pub const LAYOUT_TOP_GAP: f32 = 20.0;
    /// Blocks from the initial layout must end above `height - PADDLE_CLEARANCE`
    pub const PADDLE_CLEARANCE: f32 = 100.0;
    /// Injected event blocks must start above `height - EVENT_CLEARANCE`
    pub const EVENT_CLEARANCE: f32 = 150.0;

    /// Board (task status) layout
    pub const BOARD_HEADER_HEIGHT: f32 = 60.0;
    pub const BOARD_BLOCK_HEIGHT: f32 = 30.0;
    pub const BOARD_BLOCK_SPACING: f32 = 3.0;
    pub const BOARD_COLUMN_CAP: usize = 28;

    /// Schedule (calendar week) layout
    pub const SCHEDULE_HEADER_HEIGHT: f32 = 80.0;
    pub const SCHEDULE_TIME_COLUMN_WIDTH: f32 = 40.0;
    /// One half-hour unit; an hour slot is two units
    pub const SCHEDULE_HALF_SLOT_HEIGHT: f32 = 20.0;
    pub const SCHEDULE_BLOCK_GAP: f32 = 2.0;
    pub const SCHEDULE_DAY_CAP: usize = 25;

    /// Maximum live particles
    pub const MAX_PARTICLES: usize = 256;
}
