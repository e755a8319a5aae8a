//! Input sampling
//!
//! DOM callbacks only record what happened. The frame loop samples the
//! accumulated state once per tick; one-shot signals are consumed by the
//! sample that reports them.

use glam::Vec2;

use crate::sim::TickInput;

#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    /// Last pointer position in playfield coordinates
    pointer: Option<Vec2>,
    /// Pointer moved since the last sample
    pointer_moved: bool,
    /// Pointer left the window entirely
    pointer_gone: bool,
    launch: bool,
    pause: bool,
    action: bool,
    left_held: bool,
    right_held: bool,
    idle_mode: bool,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.pointer = Some(Vec2::new(x, y));
        self.pointer_moved = true;
        self.pointer_gone = false;
    }

    pub fn pointer_left(&mut self) {
        self.pointer_gone = true;
    }

    pub fn click(&mut self) {
        self.launch = true;
    }

    pub fn request_pause(&mut self) {
        self.pause = true;
    }

    pub fn toggle_idle_mode(&mut self) -> bool {
        self.idle_mode = !self.idle_mode;
        log::info!("Idle mode: {}", self.idle_mode);
        self.idle_mode
    }

    /// Returns true if the key is one the game uses
    pub fn key_down(&mut self, key: &str) -> bool {
        match key {
            " " | "Spacebar" => self.action = true,
            "Escape" | "p" | "P" => self.pause = true,
            "ArrowLeft" | "a" | "A" => self.left_held = true,
            "ArrowRight" | "d" | "D" => self.right_held = true,
            "i" | "I" => {
                self.toggle_idle_mode();
            }
            _ => return false,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowLeft" | "a" | "A" => self.left_held = false,
            "ArrowRight" | "d" | "D" => self.right_held = false,
            _ => {}
        }
    }

    /// Build this frame's input for a `width`×`height` playfield. The pointer
    /// counts as outside beyond `margin` pixels past any edge.
    pub fn sample(&mut self, width: f32, height: f32, margin: f32) -> TickInput {
        let pointer_outside = self.pointer_gone
            || self.pointer.is_some_and(|p| {
                p.x < -margin || p.y < -margin || p.x > width + margin || p.y > height + margin
            });

        let nudge = match (self.left_held, self.right_held) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        let input = TickInput {
            pointer_x: self.pointer.filter(|_| self.pointer_moved).map(|p| p.x),
            pointer_outside,
            launch: self.launch,
            pause: self.pause,
            action: self.action,
            nudge,
            idle_mode: self.idle_mode,
        };

        self.pointer_moved = false;
        self.launch = false;
        self.pause = false;
        self.action = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shots_are_consumed() {
        let mut sampler = InputSampler::new();
        sampler.click();
        sampler.key_down(" ");
        let first = sampler.sample(800.0, 600.0, 50.0);
        assert!(first.launch && first.action);
        let second = sampler.sample(800.0, 600.0, 50.0);
        assert!(!second.launch && !second.action);
    }

    #[test]
    fn test_pointer_margin() {
        let mut sampler = InputSampler::new();
        sampler.pointer_moved(830.0, 300.0);
        let input = sampler.sample(800.0, 600.0, 50.0);
        assert!(!input.pointer_outside);
        assert_eq!(input.pointer_x, Some(830.0));

        sampler.pointer_moved(900.0, 300.0);
        assert!(sampler.sample(800.0, 600.0, 50.0).pointer_outside);

        sampler.pointer_moved(400.0, 300.0);
        sampler.pointer_left();
        assert!(sampler.sample(800.0, 600.0, 50.0).pointer_outside);
    }

    #[test]
    fn test_pointer_reported_only_when_moved() {
        let mut sampler = InputSampler::new();
        sampler.pointer_moved(100.0, 100.0);
        assert_eq!(sampler.sample(800.0, 600.0, 50.0).pointer_x, Some(100.0));
        assert_eq!(sampler.sample(800.0, 600.0, 50.0).pointer_x, None);
    }

    #[test]
    fn test_arrow_keys_nudge() {
        let mut sampler = InputSampler::new();
        assert!(sampler.key_down("ArrowLeft"));
        assert_eq!(sampler.sample(800.0, 600.0, 50.0).nudge, -1.0);
        sampler.key_down("ArrowRight");
        assert_eq!(sampler.sample(800.0, 600.0, 50.0).nudge, 0.0);
        sampler.key_up("ArrowLeft");
        assert_eq!(sampler.sample(800.0, 600.0, 50.0).nudge, 1.0);
        assert!(!sampler.key_down("q"));
    }
}
