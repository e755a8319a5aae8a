//! The player's paddle

use serde::{Deserialize, Serialize};

use super::physics::Rect;
use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Keyboard nudge distance per reference frame
    pub speed: f32,
    pub playfield_width: f32,
}

impl Paddle {
    /// Paddle centered horizontally near the bottom of the playfield
    pub fn new(playfield_width: f32, playfield_height: f32) -> Self {
        Self {
            x: playfield_width / 2.0 - PADDLE_WIDTH / 2.0,
            y: playfield_height - PADDLE_BOTTOM_OFFSET,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
            playfield_width,
        }
    }

    /// Center the paddle under the pointer, clamped to the playfield
    pub fn update(&mut self, pointer_x: f32) {
        if !pointer_x.is_finite() {
            return;
        }
        self.x = pointer_x - self.width / 2.0;
        self.clamp_to_playfield();
    }

    /// Keyboard movement; `direction` is -1 (left) to 1 (right)
    pub fn nudge(&mut self, direction: f32, multiplier: f32) {
        if !direction.is_finite() || direction == 0.0 {
            return;
        }
        self.x += direction.clamp(-1.0, 1.0) * self.speed * multiplier;
        self.clamp_to_playfield();
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn resize(&mut self, playfield_width: f32, playfield_height: f32) {
        self.playfield_width = playfield_width;
        self.y = playfield_height - PADDLE_BOTTOM_OFFSET;
        self.clamp_to_playfield();
    }

    fn clamp_to_playfield(&mut self) {
        let max_x = (self.playfield_width - self.width).max(0.0);
        self.x = self.x.max(0.0).min(max_x);
    }
}
