//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time and frame scheduling
//! - Input sampling
//! - Storage (LocalStorage on web)
//! - Notifications

pub mod input;
pub mod notify;
pub mod storage;
pub mod time;

use std::rc::Rc;

use crate::sim::{GameEvent, GameState, tick};
use input::InputSampler;
use notify::NotificationSink;
use time::FrameScheduler;

/// Run one frame: sample input, tick, deliver notifications.
///
/// Returns the non-notification events and whether the loop should go on.
pub fn drive_frame(
    state: &mut GameState,
    sampler: &mut InputSampler,
    sink: &mut dyn NotificationSink,
    now: f64,
) -> (Vec<GameEvent>, bool) {
    let input = sampler.sample(state.width, state.height, state.tuning.auto_pause_margin);
    tick(state, &input, now);
    let events = notify::dispatch_events(state, sink);
    (events, state.phase.keeps_frame_loop_alive())
}

/// Call `frame` every frame until it returns false
pub fn run_loop<S: FrameScheduler + 'static>(scheduler: Rc<S>, frame: Rc<dyn Fn(f64) -> bool>) {
    let next = scheduler.clone();
    scheduler.request_frame(Box::new(move |now| {
        if frame(now) {
            run_loop(next, frame);
        } else {
            log::info!("Frame loop stopped");
        }
    }));
}
