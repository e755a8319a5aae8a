//! Session transitions driven by the surrounding application
//!
//! Start, pause/resume, level flow, toggles, and speed/difficulty changes.
//! The per-frame simulation lives in `tick`.

use super::effects;
use super::particle::spawn_confetti;
use super::state::{GameEvent, GamePhase, GameState, SavedMotion, Severity};
use crate::consts::{MAX_BALL_SPEED, MIN_BALL_SPEED};
use crate::data::{DataSource, SourceRecord};
use crate::messages::MessagePool;
use crate::settings::Difficulty;
use crate::tuning::Tuning;

const CONFETTI_COUNT: usize = 120;

impl GameState {
    /// Begin a fresh game from any phase but `Stopped`
    pub fn start_game(&mut self, now: f64) {
        if self.phase == GamePhase::Stopped {
            log::warn!("start_game ignored: session stopped");
            return;
        }

        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.level = 1;
        self.ball_speed = Tuning::level_speed(self.base_speed, 1);
        effects::clear_all(self);
        self.particles.clear();
        self.regenerate_blocks(now);
        self.reset_balls();

        self.last_event_time = now;
        self.last_frame_time = None;
        self.skip_normalization = false;
        self.auto_paused = false;
        self.paused_at = None;
        self.saved_motion.clear();
        self.win_at = None;
        self.level_advanced = false;

        self.set_phase(GamePhase::Playing);
    }

    /// Manual pause. Only an explicit resume ends it.
    pub fn pause_game(&mut self, now: f64) {
        self.enter_pause(now, false);
    }

    /// Pause because the pointer left the playfield; ends when it returns
    pub(crate) fn auto_pause(&mut self, now: f64) {
        self.enter_pause(now, true);
    }

    fn enter_pause(&mut self, now: f64, auto: bool) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.saved_motion = self
            .balls
            .iter()
            .map(|b| SavedMotion {
                ball_id: b.id,
                vel: b.vel,
                speed: b.speed,
            })
            .collect();
        self.paused_at = Some(now);
        self.auto_paused = auto;
        self.set_phase(GamePhase::Paused);
    }

    /// Resume from either kind of pause, restoring ball motion exactly
    pub fn resume_game(&mut self, now: f64) {
        if self.phase != GamePhase::Paused {
            return;
        }

        // A speed change made while paused wins; only the direction is kept
        for saved in std::mem::take(&mut self.saved_motion) {
            if let Some(ball) = self.balls.iter_mut().find(|b| b.id == saved.ball_id) {
                if ball.speed == saved.speed {
                    ball.vel = saved.vel;
                } else {
                    ball.vel = saved.vel.normalize_or_zero() * ball.speed;
                }
            }
        }

        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = (now - paused_at).max(0.0);
            self.effects.shift_timers(paused_for);
            self.last_event_time += paused_for;
            if let Some(win_at) = &mut self.win_at {
                *win_at += paused_for;
            }
        }

        self.skip_normalization = true;
        self.auto_paused = false;
        self.last_frame_time = None;
        self.set_phase(GamePhase::Playing);
    }

    /// Toggle between playing and paused
    pub fn toggle_pause(&mut self, now: f64) {
        match self.phase {
            GamePhase::Playing => self.pause_game(now),
            GamePhase::Paused => self.resume_game(now),
            _ => {}
        }
    }

    /// Enter `LevelComplete` once the last block is gone
    pub(crate) fn complete_level(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.set_phase(GamePhase::LevelComplete);
        self.level_advanced = false;
        effects::clear_all(self);

        spawn_confetti(&mut self.particles, &mut self.rng, self.width, CONFETTI_COUNT);
        self.emit(GameEvent::LevelComplete {
            level: self.level,
            celebration_ms: self.tuning.celebration_ms,
        });
        self.notify_from_pool(MessagePool::LevelComplete, Severity::Success);
    }

    /// "Next level" action on the level-complete screen
    pub fn proceed_to_next_level(&mut self) {
        if self.phase != GamePhase::LevelComplete || self.level_advanced {
            return;
        }
        self.level += 1;
        self.level_advanced = true;
        self.notify_from_pool(MessagePool::DifficultyWarning, Severity::Warning);
    }

    /// Build and start the next level
    pub fn start_next_level(&mut self, now: f64) {
        if self.phase != GamePhase::LevelComplete {
            log::warn!("start_next_level ignored in {:?}", self.phase);
            return;
        }
        if !self.level_advanced {
            self.level += 1;
        }
        self.level_advanced = false;

        if self.tuning.alternate_sources {
            self.data_source = match self.data_source {
                DataSource::Schedule => DataSource::Board,
                DataSource::Board => DataSource::Schedule,
            };
        }

        effects::clear_all(self);
        self.ball_speed = Tuning::level_speed(self.base_speed, self.level);
        self.regenerate_blocks(now);
        self.reset_balls();
        self.last_event_time = now;
        self.last_frame_time = None;
        log::info!("Level {} at speed {:.2}", self.level, self.ball_speed);

        self.set_phase(GamePhase::Playing);
        if self.level > self.tuning.max_level {
            self.win_at = Some(now + self.tuning.win_delay_ms);
        }
    }

    /// Switch to `Win` once the scheduled time has come
    pub(crate) fn check_win(&mut self, now: f64) {
        if self.win_at.is_some_and(|win_at| now >= win_at) {
            self.win_at = None;
            effects::clear_all(self);
            self.set_phase(GamePhase::Win);
        }
    }

    /// A ball count of zero: lose a life and serve again, or end the game
    pub(crate) fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.emit(GameEvent::LifeLost {
            lives_left: self.lives,
        });
        log::info!("Life lost, {} left", self.lives);

        if self.lives == 0 {
            self.game_over();
        } else {
            effects::clear_all(self);
            self.reset_balls();
        }
    }

    fn game_over(&mut self) {
        effects::clear_all(self);
        self.level = 1;
        self.ball_speed = self.base_speed;
        self.win_at = None;
        self.balls.clear();
        self.set_phase(GamePhase::GameOver);
        self.notify_from_pool(MessagePool::GameOver, Severity::Error);
    }

    pub fn set_random_blocks_enabled(&mut self, enabled: bool) {
        self.random_blocks_enabled = enabled;
        let state = if enabled { "enabled" } else { "disabled" };
        self.notify(format!("Random blocks {}", state), Severity::Info);
    }

    pub fn set_power_ups_enabled(&mut self, enabled: bool) {
        self.power_ups_enabled = enabled;
        let state = if enabled { "enabled" } else { "disabled" };
        self.notify(format!("Power-ups {}", state), Severity::Info);
    }

    /// Set the level speed and apply it to every ball.
    ///
    /// Clamped to the allowed range; a non-finite value resets to the curve
    /// speed for the current level.
    pub fn set_ball_speed(&mut self, speed: f32) {
        let speed = if speed.is_finite() {
            speed.clamp(MIN_BALL_SPEED, MAX_BALL_SPEED)
        } else {
            log::warn!("Ignoring non-finite ball speed");
            Tuning::level_speed(self.base_speed, self.level)
        };
        self.ball_speed = speed;

        let effective = self.effective_ball_speed();
        for ball in &mut self.balls {
            ball.set_speed(effective);
        }
    }

    /// Apply a difficulty preset by key (`easy`, `normal`, `hard`)
    pub fn set_difficulty(&mut self, key: &str) {
        let difficulty = Difficulty::from_str(key).unwrap_or_else(|| {
            log::warn!("Unknown difficulty '{}', using normal", key);
            Difficulty::Normal
        });
        self.base_speed = difficulty.speed();
        self.set_ball_speed(Tuning::level_speed(self.base_speed, self.level));
        self.notify(format!("Difficulty set to {}", difficulty.as_str()), Severity::Info);
    }

    /// Change data source. `Some` records replace the stored ones for that
    /// source; the grid is rebuilt if a game is on screen.
    pub fn switch_data_source(
        &mut self,
        source: DataSource,
        records: Option<Vec<SourceRecord>>,
        now: f64,
    ) {
        if let Some(records) = records {
            self.set_records(source, Some(records));
        }
        self.data_source = source;
        log::info!("Data source {:?}", source);

        if matches!(self.phase, GamePhase::Start | GamePhase::Playing) {
            self.regenerate_blocks(now);
        }
    }

    /// New playfield size; the paddle is re-clamped
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.width = width;
        self.height = height;
        self.paddle.resize(width, height);
    }

    /// Tear down; the frame loop ends after this
    pub fn stop(&mut self) {
        self.set_phase(GamePhase::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;
    use glam::Vec2;

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_game(0.0);
        state
    }

    #[test]
    fn test_start_resets_session() {
        let mut state = GameState::new(1);
        state.score = 500;
        state.lives = 1;
        state.level = 4;
        state.start_game(0.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!((state.score, state.lives, state.level), (0, 3, 1));
        assert_eq!(state.balls.len(), 1);
        assert!(state.active_block_count() > 0);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let mut state = started(2);
        state.stop();
        state.start_game(10.0);
        assert_eq!(state.phase, GamePhase::Stopped);
        assert!(!state.phase.keeps_frame_loop_alive());
    }

    #[test]
    fn test_pause_restores_exact_velocity() {
        let mut state = started(3);
        state.balls[0].launched = true;
        state.balls[0].vel = Vec2::new(3.0, -4.0);
        state.balls[0].speed = 5.0;

        state.pause_game(100.0);
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(!state.auto_paused);
        state.balls[0].vel = Vec2::ZERO;

        state.resume_game(2100.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.balls[0].vel, Vec2::new(3.0, -4.0));
        assert_eq!(state.balls[0].speed, 5.0);
        assert!(state.skip_normalization);
        assert_eq!(state.last_event_time, 2000.0);
    }

    #[test]
    fn test_speed_change_while_paused_survives_resume() {
        let mut state = started(3);
        state.balls[0].launch(Vec2::new(1.0, -1.0));
        let direction = state.balls[0].vel.normalize();

        state.pause_game(100.0);
        state.set_ball_speed(12.0);
        state.resume_game(500.0);

        let ball = &state.balls[0];
        assert_eq!(state.ball_speed, 12.0);
        assert_eq!(ball.speed, 12.0);
        assert!((ball.vel.length() - 12.0).abs() < 1e-4);
        assert!((ball.vel.normalize() - direction).length() < 1e-5);
    }

    #[test]
    fn test_pause_shifts_effect_timers() {
        let mut state = started(4);
        effects::activate(&mut state, EffectKind::ShrinkBall, 0.0);
        state.pause_game(1000.0);
        state.resume_game(6000.0);
        let at = state.tuning.shrink_duration_ms + 1000.0;
        effects::update_effects(&mut state, at);
        assert!(state.effects.is_active(EffectKind::ShrinkBall));
    }

    #[test]
    fn test_level_flow_advances_once() {
        let mut state = started(5);
        state.complete_level();
        state.complete_level();
        let completions = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
            .count();
        assert_eq!(completions, 1);

        state.proceed_to_next_level();
        state.proceed_to_next_level();
        assert_eq!(state.level, 2);

        state.start_next_level(500.0);
        assert_eq!(state.level, 2);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.data_source, DataSource::Board);
        assert!((state.ball_speed - Tuning::level_speed(8.0, 2)).abs() < 1e-6);
        assert!((state.balls[0].speed - 8.9).abs() < 1e-5);
    }

    #[test]
    fn test_start_next_level_without_proceed_still_advances() {
        let mut state = started(6);
        state.complete_level();
        state.start_next_level(0.0);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_win_after_max_level() {
        let mut state = started(7);
        state.level = state.tuning.max_level;
        state.complete_level();
        state.start_next_level(1000.0);
        assert_eq!(state.phase, GamePhase::Playing);
        state.check_win(1050.0);
        assert_eq!(state.phase, GamePhase::Playing);
        state.check_win(1100.0);
        assert_eq!(state.phase, GamePhase::Win);
    }

    #[test]
    fn test_game_over_resets_level_and_speed() {
        let mut state = started(8);
        state.level = 5;
        state.ball_speed = 12.0;
        for _ in 0..3 {
            state.lose_life();
        }
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.level, 1);
        assert_eq!(state.ball_speed, state.base_speed);
        assert!(state.effects.active.is_empty());
    }

    #[test]
    fn test_set_ball_speed_clamps() {
        let mut state = started(9);
        state.set_ball_speed(100.0);
        assert_eq!(state.ball_speed, MAX_BALL_SPEED);
        state.set_ball_speed(f32::NAN);
        assert_eq!(state.ball_speed, Tuning::level_speed(state.base_speed, 1));
        assert_eq!(state.balls[0].speed, state.ball_speed);
    }

    #[test]
    fn test_unknown_difficulty_falls_back_to_normal() {
        let mut state = started(10);
        state.set_difficulty("hard");
        assert_eq!(state.base_speed, 10.0);
        state.set_difficulty("nightmare");
        assert_eq!(state.base_speed, 8.0);
        assert_eq!(state.ball_speed, 8.0);
    }

    #[test]
    fn test_toggles_notify() {
        let mut state = started(11);
        state.take_events();
        state.set_random_blocks_enabled(false);
        state.set_power_ups_enabled(true);
        let messages: Vec<String> = state
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Notify { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec!["Random blocks disabled", "Power-ups enabled"]);
        assert!(!state.random_blocks_enabled);
    }

    #[test]
    fn test_switch_data_source_regenerates() {
        let mut state = started(12);
        let tasks = vec![SourceRecord::task("PROJ-1", "Fix login", "To Do", "Urgent")];
        state.switch_data_source(DataSource::Board, Some(tasks), 0.0);
        assert_eq!(state.data_source, DataSource::Board);
        assert!(state.blocks.iter().all(|b| b.source.title == "Fix login"));
        assert!(state.blocks.iter().all(|b| b.max_strength == 3));
    }
}
