//! Collision detection and response for an axis-aligned playfield
//!
//! Rectangles, circles, reflections and the paddle bounce curve. Everything
//! here is stateless and deterministic given its inputs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_BOUNCE_ANGLE;

/// Axis-aligned rectangle, origin at the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Bounding box of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
    }
}

/// Which face of a rectangle a circle struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionSide {
    /// Top or bottom face: flips the vertical velocity
    Horizontal,
    /// Left or right face: flips the horizontal velocity
    Vertical,
    /// Circle center is outside the rectangle on both axes
    Corner,
}

/// Axis-aligned overlap test. Touching edges do not count.
#[inline]
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Classify a circle/rectangle contact.
///
/// Finds the point of the rectangle closest to the circle center. A closest
/// point that differs from the center on both axes is a corner hit. Otherwise
/// the center's offset from the rectangle center is compared per axis,
/// normalized by the half extents: a dominant horizontal ratio means the ball
/// struck a left/right face (`Vertical`), anything else a top/bottom face.
///
/// Returns `None` when the closest point is `radius` or farther away, so a
/// ball resting against a face does not register.
pub fn circle_rect_collision_side(center: Vec2, radius: f32, rect: &Rect) -> Option<CollisionSide> {
    // max/min rather than clamp: clamp panics on degenerate rects
    let closest = Vec2::new(
        center.x.max(rect.x).min(rect.right()),
        center.y.max(rect.y).min(rect.bottom()),
    );
    let offset = center - closest;
    if offset.length() >= radius {
        return None;
    }

    if offset.x != 0.0 && offset.y != 0.0 {
        return Some(CollisionSide::Corner);
    }

    let from_center = center - rect.center();
    let ratio_x = from_center.x.abs() / (rect.width / 2.0).max(f32::EPSILON);
    let ratio_y = from_center.y.abs() / (rect.height / 2.0).max(f32::EPSILON);

    if ratio_x > ratio_y {
        Some(CollisionSide::Vertical)
    } else {
        Some(CollisionSide::Horizontal)
    }
}

/// Reflect a velocity off the given side
#[inline]
pub fn reflect(velocity: Vec2, side: CollisionSide) -> Vec2 {
    match side {
        CollisionSide::Horizontal => Vec2::new(velocity.x, -velocity.y),
        CollisionSide::Vertical => Vec2::new(-velocity.x, velocity.y),
        CollisionSide::Corner => -velocity,
    }
}

/// Velocity after a paddle hit.
///
/// The hit offset from the paddle center, normalized to [-1, 1], maps linearly
/// onto a bounce angle within ±60° of straight up. Speed is preserved and the
/// result always points up (negative y) for a moving ball.
pub fn paddle_bounce_velocity(ball_x: f32, paddle_x: f32, paddle_width: f32, current: Vec2) -> Vec2 {
    let half_width = (paddle_width / 2.0).max(f32::EPSILON);
    let paddle_center = paddle_x + paddle_width / 2.0;
    let hit_offset = ((ball_x - paddle_center) / half_width).clamp(-1.0, 1.0);

    let bounce_angle = hit_offset * MAX_BOUNCE_ANGLE;
    let speed = current.length();

    Vec2::new(
        bounce_angle.sin() * speed,
        -bounce_angle.cos().abs() * speed,
    )
}

/// Rescale a velocity to `target_speed`. The zero vector is returned unchanged.
#[inline]
pub fn normalize_to_speed(velocity: Vec2, target_speed: f32) -> Vec2 {
    let current = velocity.length();
    if current == 0.0 {
        return velocity;
    }
    velocity * (target_speed / current)
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
