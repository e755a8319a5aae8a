//! Power-up effects
//!
//! A destroyed block with a power tag activates a random effect of matching
//! polarity. At most one effect of each kind runs at a time; activating a
//! running kind does nothing.
//!
//! Budgets:
//! - multi-ball lasts until the ball count falls back to one
//! - explosion and chain reaction hold one charge, spent on the next
//!   destroyed block
//! - chaos and shrink run for a fixed wall-clock time
//! - extra blocks act immediately and stay listed briefly for the HUD

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::block::PowerTag;
use super::events::spawn_urgent_block;
use super::particle::{spawn_debris, spawn_lightning};
use super::physics::distance;
use super::state::{GameEvent, GameState};
use crate::consts::BALL_RADIUS;

/// How long the extra-blocks effect stays listed after spawning its blocks
pub const EXTRA_BLOCKS_DISPLAY_MS: f64 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    MultiBall,
    Explosion,
    ChainReaction,
    ExtraBlocks,
    ChaosDirection,
    ShrinkBall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Beneficial,
    Detrimental,
}

impl EffectKind {
    pub const BENEFICIAL: [EffectKind; 3] = [
        EffectKind::MultiBall,
        EffectKind::Explosion,
        EffectKind::ChainReaction,
    ];
    pub const DETRIMENTAL: [EffectKind; 3] = [
        EffectKind::ExtraBlocks,
        EffectKind::ChaosDirection,
        EffectKind::ShrinkBall,
    ];

    pub fn polarity(self) -> Polarity {
        if Self::BENEFICIAL.contains(&self) {
            Polarity::Beneficial
        } else {
            Polarity::Detrimental
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectBudget {
    UntilSingleBall,
    Timed { expires_at: f64 },
    Charges(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub polarity: Polarity,
    pub activated_at: f64,
    pub budget: EffectBudget,
    /// Last chaos re-randomization
    pub last_pulse_at: f64,
}

/// A chain-reaction target waiting for its turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainStrike {
    pub block_id: u32,
    /// Bolt origin
    pub from: Vec2,
    pub at: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub active: BTreeMap<EffectKind, ActiveEffect>,
    pub pending_strikes: Vec<ChainStrike>,
}

impl Effects {
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Move every deadline later by `ms` (time spent paused)
    pub fn shift_timers(&mut self, ms: f64) {
        for effect in self.active.values_mut() {
            effect.activated_at += ms;
            effect.last_pulse_at += ms;
            if let EffectBudget::Timed { expires_at } = &mut effect.budget {
                *expires_at += ms;
            }
        }
        for strike in &mut self.pending_strikes {
            strike.at += ms;
        }
    }
}

/// Activate a random effect of the tag's polarity
pub fn activate_for_tag(state: &mut GameState, tag: PowerTag, now: f64) -> Option<EffectKind> {
    let pool = match tag {
        PowerTag::None => return None,
        PowerTag::Beneficial => EffectKind::BENEFICIAL,
        PowerTag::Detrimental => EffectKind::DETRIMENTAL,
    };
    let kind = pool[state.rng.random_range(0..pool.len())];
    activate(state, kind, now).then_some(kind)
}

/// Start an effect. Returns false if it was already running or could not
/// take hold (multi-ball with no ball in play).
pub fn activate(state: &mut GameState, kind: EffectKind, now: f64) -> bool {
    if state.effects.is_active(kind) {
        log::debug!("{:?} already active", kind);
        return false;
    }

    let budget = match kind {
        EffectKind::MultiBall => {
            if !spawn_extra_balls(state) {
                return false;
            }
            EffectBudget::UntilSingleBall
        }
        EffectKind::Explosion | EffectKind::ChainReaction => EffectBudget::Charges(1),
        EffectKind::ExtraBlocks => {
            let spawned = (0..state.tuning.extra_blocks)
                .filter_map(|_| spawn_urgent_block(state, now, false))
                .count();
            log::debug!("Extra blocks spawned {}", spawned);
            EffectBudget::Timed {
                expires_at: now + EXTRA_BLOCKS_DISPLAY_MS,
            }
        }
        EffectKind::ChaosDirection => {
            randomize_directions(state);
            EffectBudget::Timed {
                expires_at: now + state.tuning.chaos_duration_ms,
            }
        }
        EffectKind::ShrinkBall => EffectBudget::Timed {
            expires_at: now + state.tuning.shrink_duration_ms,
        },
    };

    let polarity = kind.polarity();
    state.effects.active.insert(
        kind,
        ActiveEffect {
            kind,
            polarity,
            activated_at: now,
            budget,
            last_pulse_at: now,
        },
    );

    if kind == EffectKind::ShrinkBall {
        let radius = BALL_RADIUS * state.tuning.shrink_radius_factor;
        let speed = state.effective_ball_speed();
        for ball in &mut state.balls {
            ball.radius = radius;
            ball.set_speed(speed);
        }
    }

    log::info!("Power-up {:?} ({:?}) activated", kind, polarity);
    state.emit(GameEvent::EffectActivated { kind, polarity });
    true
}

/// Two extra balls from the first live ball, veered 0.3 to 0.6 rad either side
fn spawn_extra_balls(state: &mut GameState) -> bool {
    let Some(primary) = state.balls.iter().find(|b| b.launched).or(state.balls.first()).cloned()
    else {
        return false;
    };

    let direction = if primary.vel.length_squared() > 0.0 {
        primary.vel.normalize()
    } else {
        super::ball::DEFAULT_LAUNCH_DIRECTION.normalize()
    };

    for i in 0..state.tuning.multi_ball_count {
        let side = if i % 2 == 0 { -1.0 } else { 1.0 };
        let angle = side * state.rng.random_range(0.3..0.6);
        let id = state.next_entity_id();
        let mut ball = Ball::new(id, primary.pos, primary.speed);
        ball.radius = primary.radius;
        let mut dir = Vec2::from_angle(angle).rotate(direction);
        // Never send a fresh ball straight down at the paddle's blind side
        if dir.y > 0.0 && primary.vel.y <= 0.0 {
            dir.y = -dir.y;
        }
        ball.launch(dir);
        state.balls.push(ball);
    }
    true
}

/// New random direction for every live ball, speed preserved.
/// Angles stay between 30° and 150° from horizontal so balls never go flat.
fn randomize_directions(state: &mut GameState) {
    for ball in state.balls.iter_mut().filter(|b| b.launched) {
        let angle = state.rng.random_range(PI / 6.0..5.0 * PI / 6.0);
        let vertical = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        ball.vel = Vec2::new(angle.cos(), angle.sin() * vertical) * ball.speed;
    }
}

fn cleanup(state: &mut GameState, kind: EffectKind) {
    if kind == EffectKind::ShrinkBall {
        // Back to the current level speed, which may differ from pre-shrink
        let speed = state.ball_speed;
        for ball in &mut state.balls {
            ball.radius = BALL_RADIUS;
            ball.set_speed(speed);
        }
    }
}

fn expire(state: &mut GameState, kind: EffectKind) {
    if state.effects.active.remove(&kind).is_some() {
        cleanup(state, kind);
        log::info!("Power-up {:?} expired", kind);
        state.emit(GameEvent::EffectExpired { kind });
    }
}

/// Expire every effect (running cleanups) and drop pending chain strikes
pub fn clear_all(state: &mut GameState) {
    let kinds: Vec<EffectKind> = state.effects.active.keys().copied().collect();
    for kind in kinds {
        expire(state, kind);
    }
    state.effects.pending_strikes.clear();
}

/// Per-frame effect bookkeeping: expiries, chaos pulses, multi-ball end,
/// and due chain strikes
pub fn update_effects(state: &mut GameState, now: f64) {
    let mut expired = Vec::new();
    let mut pulse = false;

    for effect in state.effects.active.values_mut() {
        match effect.budget {
            EffectBudget::Timed { expires_at } if now >= expires_at => expired.push(effect.kind),
            EffectBudget::UntilSingleBall if state.balls.len() <= 1 => expired.push(effect.kind),
            EffectBudget::Charges(0) => expired.push(effect.kind),
            _ => {
                if effect.kind == EffectKind::ChaosDirection
                    && now - effect.last_pulse_at >= state.tuning.chaos_pulse_ms
                {
                    effect.last_pulse_at = now;
                    pulse = true;
                }
            }
        }
    }

    if pulse {
        randomize_directions(state);
    }
    for kind in expired {
        expire(state, kind);
    }

    resolve_chain_strikes(state, now);
}

fn resolve_chain_strikes(state: &mut GameState, now: f64) {
    if state.effects.pending_strikes.is_empty() {
        return;
    }
    let (due, waiting): (Vec<ChainStrike>, Vec<ChainStrike>) =
        std::mem::take(&mut state.effects.pending_strikes)
            .into_iter()
            .partition(|s| s.at <= now);
    state.effects.pending_strikes = waiting;

    for strike in due {
        let Some(index) = state.blocks.iter().position(|b| b.id == strike.block_id) else {
            continue;
        };
        let target = state.blocks[index].bounds.center();
        spawn_lightning(&mut state.particles, strike.from, target);
        log::debug!("Chain strike on block {}", strike.block_id);
        shatter_block(state, index);
    }
}

/// Destroy a block as collateral: scores it, but it releases no power-up
/// and triggers no further specials. Returns false if it was already gone.
fn shatter_block(state: &mut GameState, index: usize) -> bool {
    let block = &mut state.blocks[index];
    if !block.shatter() {
        return false;
    }
    let score = block.get_score();
    let block_id = block.id;
    let center = block.bounds.center();

    state.score += score;
    spawn_debris(&mut state.particles, &mut state.rng, center);
    state.emit(GameEvent::BlockDestroyed { block_id, score });
    true
}

/// Spend one charge of `kind` if it is armed
fn take_charge(state: &mut GameState, kind: EffectKind) -> bool {
    let Some(effect) = state.effects.active.get_mut(&kind) else {
        return false;
    };
    let EffectBudget::Charges(charges) = &mut effect.budget else {
        return false;
    };
    if *charges == 0 {
        return false;
    }
    *charges -= 1;
    if *charges == 0 {
        expire(state, kind);
    }
    true
}

/// Run armed specials for a block the ball just destroyed at `origin`
pub fn on_block_destroyed(state: &mut GameState, origin_id: u32, origin: Vec2, now: f64) {
    if take_charge(state, EffectKind::Explosion) {
        explode(state, origin);
    }
    if take_charge(state, EffectKind::ChainReaction) {
        schedule_chain(state, origin_id, origin, now);
    }
}

/// Destroy every live block whose center is within the blast radius
fn explode(state: &mut GameState, origin: Vec2) {
    let radius = state.tuning.explosion_radius;
    let victims: Vec<usize> = state
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_active() && distance(b.bounds.center(), origin) <= radius)
        .map(|(i, _)| i)
        .collect();

    log::info!("Explosion at {:?} destroys {} blocks", origin, victims.len());
    for index in victims {
        shatter_block(state, index);
    }
}

/// Queue the nearest live blocks for staggered strikes
fn schedule_chain(state: &mut GameState, origin_id: u32, origin: Vec2, now: f64) {
    let mut candidates: Vec<(f32, u32)> = state
        .blocks
        .iter()
        .filter(|b| b.is_active() && b.id != origin_id)
        .filter(|b| !state.effects.pending_strikes.iter().any(|s| s.block_id == b.id))
        .map(|b| (distance(b.bounds.center(), origin), b.id))
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let stagger = state.tuning.chain_stagger_ms;
    for (i, (_, block_id)) in candidates
        .into_iter()
        .take(state.tuning.chain_targets)
        .enumerate()
    {
        state.effects.pending_strikes.push(ChainStrike {
            block_id,
            from: origin,
            at: now + stagger * (i + 1) as f64,
        });
    }
}
