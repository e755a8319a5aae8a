//! Ball entity
//!
//! Velocities are in pixels per reference frame (`FRAME_MS`); `update` scales
//! them by the real elapsed time so movement is framerate independent.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::paddle::Paddle;
use super::physics::{
    CollisionSide, Rect, circle_rect_collision_side, normalize_to_speed, paddle_bounce_velocity,
    rect_overlap, reflect,
};
use crate::consts::*;

/// Launch direction when none is given: up and to the right
pub const DEFAULT_LAUNCH_DIRECTION: Vec2 = Vec2::new(1.0, -1.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Target magnitude of `vel` while launched
    pub speed: f32,
    pub radius: f32,
    pub launched: bool,
    /// Recent positions, oldest first
    #[serde(skip)]
    pub trail: VecDeque<Vec2>,
}

/// Movement multiplier for a frame of `elapsed_ms`, capped so a long stall
/// (tab switch, throttling) cannot teleport the ball
#[inline]
pub fn time_multiplier(elapsed_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() {
        return 1.0;
    }
    (elapsed_ms / FRAME_MS).clamp(0.0, MAX_FRAME_MULTIPLIER)
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            speed,
            radius: BALL_RADIUS,
            launched: false,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Start moving along `direction` at the current speed
    pub fn launch(&mut self, direction: Vec2) {
        let direction = if direction.length_squared() > 0.0 {
            direction
        } else {
            DEFAULT_LAUNCH_DIRECTION
        };
        self.vel = normalize_to_speed(direction, self.speed);
        self.launched = true;
    }

    /// Advance one frame. Returns true if the ball bounced off a wall.
    ///
    /// The bottom edge is open; falling through it is detected with
    /// [`Ball::is_out_of_bounds`]. `skip_normalization` leaves the velocity
    /// exactly as it is, for the frame right after a restore.
    pub fn update(&mut self, width: f32, skip_normalization: bool, elapsed_ms: f32) -> bool {
        if !self.launched {
            return false;
        }

        self.trail.push_back(self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }

        self.pos += self.vel * time_multiplier(elapsed_ms);

        // Force the sign outward rather than negating, so a ball resting on a
        // wall can never flip back into it
        let mut bounced = false;
        if self.pos.x - self.radius <= 0.0 {
            self.pos.x = self.radius;
            self.vel.x = self.vel.x.abs();
            bounced = true;
        } else if self.pos.x + self.radius >= width {
            self.pos.x = width - self.radius;
            self.vel.x = -self.vel.x.abs();
            bounced = true;
        }

        if self.pos.y - self.radius <= 0.0 {
            self.pos.y = self.radius;
            self.vel.y = self.vel.y.abs();
            bounced = true;
        }

        if !skip_normalization {
            self.vel = normalize_to_speed(self.vel, self.speed);
        }

        bounced
    }

    pub fn bounds(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }

    /// Bounce off the paddle when overlapping it while falling
    pub fn check_paddle_collision(&mut self, paddle: &Paddle) -> bool {
        if self.vel.y <= 0.0 || !rect_overlap(&self.bounds(), &paddle.bounds()) {
            return false;
        }

        self.vel = paddle_bounce_velocity(self.pos.x, paddle.x, paddle.width, self.vel);
        self.pos.y = paddle.y - self.radius;
        true
    }

    /// Bounce off a block, leaving the ball just outside it.
    ///
    /// The ball is moved clear of the block along the collision axis and its
    /// velocity on that axis points away, so residual overlap cannot register
    /// a second hit on the next frame.
    pub fn check_block_collision(&mut self, block: &Rect) -> Option<CollisionSide> {
        let side = circle_rect_collision_side(self.pos, self.radius, block)?;
        self.vel = reflect(self.vel, side);

        let from_center = self.pos - block.center();
        let push_vertical = |ball: &mut Ball| {
            if from_center.y < 0.0 {
                ball.pos.y = block.y - ball.radius;
                ball.vel.y = -ball.vel.y.abs();
            } else {
                ball.pos.y = block.bottom() + ball.radius;
                ball.vel.y = ball.vel.y.abs();
            }
        };
        let push_horizontal = |ball: &mut Ball| {
            if from_center.x < 0.0 {
                ball.pos.x = block.x - ball.radius;
                ball.vel.x = -ball.vel.x.abs();
            } else {
                ball.pos.x = block.right() + ball.radius;
                ball.vel.x = ball.vel.x.abs();
            }
        };

        match side {
            CollisionSide::Horizontal => push_vertical(self),
            CollisionSide::Vertical => push_horizontal(self),
            CollisionSide::Corner => {
                let ratio_x = from_center.x.abs() / (block.width / 2.0).max(f32::EPSILON);
                let ratio_y = from_center.y.abs() / (block.height / 2.0).max(f32::EPSILON);
                if ratio_x > ratio_y {
                    push_horizontal(self);
                } else {
                    push_vertical(self);
                }
            }
        }

        Some(side)
    }

    /// Park the ball, unlaunched, at the given position
    pub fn reset(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
        self.vel = Vec2::ZERO;
        self.launched = false;
        self.trail.clear();
    }

    /// Change speed, keeping the current direction
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        if self.launched {
            self.vel = normalize_to_speed(self.vel, speed);
        }
    }

    /// True once the top edge of the ball is below the playfield
    pub fn is_out_of_bounds(&self, height: f32) -> bool {
        self.pos.y - self.radius > height
    }
}
