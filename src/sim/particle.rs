//! Visual particles
//!
//! Purely cosmetic: nothing in gameplay reads them. One struct with a kind
//! tag, updated by a single dispatch on that tag.

use glam::Vec2;
use rand::Rng;

use crate::consts::MAX_PARTICLES;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// Shards from a destroyed block; falls under gravity
    Debris,
    /// Level-clear celebration; drifts down slowly
    Confetti,
    /// Short flash at a paddle hit
    Spark,
    /// Chain-reaction bolt from `pos` to the target
    Lightning { to: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 when spawned, removed at 0
    pub life: f32,
    pub size: f32,
    /// Color hue in degrees
    pub hue: f32,
}

const DEBRIS_GRAVITY: f32 = 0.2;
const DEBRIS_DECAY: f32 = 0.02;
const CONFETTI_GRAVITY: f32 = 0.05;
const CONFETTI_DECAY: f32 = 0.008;
const SPARK_DECAY: f32 = 0.08;
const LIGHTNING_DECAY: f32 = 0.04;

impl Particle {
    /// Advance by `frames` reference frames
    pub fn update(&mut self, frames: f32) {
        match self.kind {
            ParticleKind::Debris => {
                self.pos += self.vel * frames;
                self.vel.y += DEBRIS_GRAVITY * frames;
                self.life -= DEBRIS_DECAY * frames;
            }
            ParticleKind::Confetti => {
                self.pos += self.vel * frames;
                self.vel.y += CONFETTI_GRAVITY * frames;
                self.vel.x *= 0.99;
                self.life -= CONFETTI_DECAY * frames;
            }
            ParticleKind::Spark => {
                self.pos += self.vel * frames;
                self.vel *= 0.9;
                self.life -= SPARK_DECAY * frames;
            }
            ParticleKind::Lightning { .. } => {
                self.life -= LIGHTNING_DECAY * frames;
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Oldest particles dropped at once when the pool is full
const EVICT_BATCH: usize = MAX_PARTICLES / 4;

fn push(particles: &mut Vec<Particle>, particle: Particle) {
    if particles.len() >= MAX_PARTICLES {
        let evict = (particles.len() + 1 - MAX_PARTICLES).max(EVICT_BATCH);
        particles.drain(..evict);
    }
    particles.push(particle);
}

/// Eight shards flying out of `pos`
pub fn spawn_debris<R: Rng + ?Sized>(particles: &mut Vec<Particle>, rng: &mut R, pos: Vec2) {
    for _ in 0..8 {
        let vel = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * 6.0;
        push(
            particles,
            Particle {
                kind: ParticleKind::Debris,
                pos,
                vel,
                life: 1.0,
                size: 3.0,
                hue: rng.random_range(0.0..360.0),
            },
        );
    }
}

/// Confetti raining from the top edge
pub fn spawn_confetti<R: Rng + ?Sized>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    width: f32,
    count: usize,
) {
    for _ in 0..count {
        let pos = Vec2::new(rng.random_range(0.0..width.max(1.0)), -10.0);
        let vel = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(1.0..4.0));
        push(
            particles,
            Particle {
                kind: ParticleKind::Confetti,
                pos,
                vel,
                life: 1.0,
                size: rng.random_range(3.0..7.0),
                hue: rng.random_range(0.0..360.0),
            },
        );
    }
}

/// A few sparks kicked upward from `pos`
pub fn spawn_sparks<R: Rng + ?Sized>(particles: &mut Vec<Particle>, rng: &mut R, pos: Vec2) {
    for _ in 0..4 {
        let vel = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(-3.0..-1.0));
        push(
            particles,
            Particle {
                kind: ParticleKind::Spark,
                pos,
                vel,
                life: 1.0,
                size: 2.0,
                hue: 50.0,
            },
        );
    }
}

pub fn spawn_lightning(particles: &mut Vec<Particle>, from: Vec2, to: Vec2) {
    push(
        particles,
        Particle {
            kind: ParticleKind::Lightning { to },
            pos: from,
            vel: Vec2::ZERO,
            life: 1.0,
            size: 2.0,
            hue: 180.0,
        },
    );
}

/// Advance all particles and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, frames: f32) {
    for particle in particles.iter_mut() {
        particle.update(frames);
    }
    particles.retain(Particle::is_alive);
}
