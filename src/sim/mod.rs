//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform calls:
//! - Time comes in as explicit timestamps
//! - Seeded RNG only, owned by the session
//! - Stable iteration order (insertion order, entity IDs)

pub mod ball;
pub mod block;
pub mod effects;
pub mod events;
pub mod layout;
pub mod paddle;
pub mod particle;
pub mod physics;
pub mod session;
pub mod state;
pub mod tick;

pub use ball::Ball;
pub use block::{Block, BlockCategory, PowerTag};
pub use effects::{ActiveEffect, EffectBudget, EffectKind, Polarity};
pub use layout::{Layout, Slot};
pub use paddle::Paddle;
pub use particle::{Particle, ParticleKind};
pub use physics::{CollisionSide, Rect};
pub use state::{GameEvent, GamePhase, GameSnapshot, GameState, Severity};
pub use tick::{TickInput, tick};
