//! Random workplace events
//!
//! While playing, every `event_interval_ms` there is a level-dependent chance
//! that an urgent block drops into a vacant slot. Injected blocks glow, may
//! carry a power-up, and never overlap existing blocks.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::block::{Block, BlockCategory, PowerTag};
use super::state::{GameEvent, GameState, Severity};
use crate::data::{BOARD_STATUSES, DataSource, SourceRecord};
use crate::messages::MessagePool;

const URGENT_MEETINGS: [&str; 4] = [
    "Emergency Sync",
    "Quick Check-in",
    "Urgent Review",
    "Last-minute Call",
];

const URGENT_TASKS: [&str; 4] = [
    "Hotfix needed",
    "Critical bug",
    "Urgent feature",
    "Emergency patch",
];

/// Once the interval has elapsed, roll every tick until an event fires.
/// Only a successful roll restarts the interval.
pub fn maybe_trigger_random_event(state: &mut GameState, now: f64) -> Option<u32> {
    if !state.random_blocks_enabled {
        return None;
    }
    if now - state.last_event_time < state.tuning.event_interval_ms {
        return None;
    }

    let chance = state.tuning.event_chance(state.level);
    if !state.rng.random_bool(chance) {
        return None;
    }
    state.last_event_time = now;
    trigger_random_event(state, now)
}

/// Inject an urgent block and announce it. Does nothing if the grid is full.
pub fn trigger_random_event(state: &mut GameState, now: f64) -> Option<u32> {
    let block_id = spawn_urgent_block(state, now, true)?;
    state.notify_from_pool(MessagePool::RandomEvent, Severity::Warning);
    state.emit(GameEvent::RandomEvent { block_id });
    Some(block_id)
}

/// Place one urgent block in a random vacant slot.
///
/// Returns the new block's id, or `None` when no slot is free.
pub fn spawn_urgent_block(state: &mut GameState, now: f64, allow_power: bool) -> Option<u32> {
    let slots = state.layout().find_available_positions(&state.blocks);
    let Some(&slot) = slots.choose(&mut state.rng) else {
        log::warn!("No free slot for an urgent block");
        return None;
    };

    let record = match state.data_source {
        DataSource::Schedule => {
            let title = URGENT_MEETINGS[state.rng.random_range(0..URGENT_MEETINGS.len())];
            SourceRecord::meeting(title, 30)
        }
        DataSource::Board => {
            let title = URGENT_TASKS[state.rng.random_range(0..URGENT_TASKS.len())];
            SourceRecord::task(
                format!("URGENT-{}", now as u64),
                title,
                BOARD_STATUSES[slot.column % BOARD_STATUSES.len()],
                "high",
            )
        }
    };

    let id = state.next_entity_id();
    let category = BlockCategory::for_source(state.data_source);
    let mut block = Block::new(id, slot.bounds, record, category, slot.column);
    block.spawned_as_event = true;
    block.glow = true;
    block.spawn_time = now;

    let power_chance = state.tuning.power_up_chance.clamp(0.0, 1.0);
    if allow_power && state.power_ups_enabled && state.rng.random_bool(power_chance) {
        block.power_tag = if state.rng.random_bool(0.5) {
            PowerTag::Beneficial
        } else {
            PowerTag::Detrimental
        };
    }

    log::info!(
        "Urgent block '{}' in column {} ({:?})",
        block.source.title,
        slot.column,
        block.power_tag
    );
    state.blocks.push(block);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::rect_overlap;
    use crate::tuning::Tuning;

    #[test]
    fn test_event_respects_interval_and_toggle() {
        let tuning = Tuning {
            event_chance_base: 1.0,
            event_chance_cap: 1.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(3, tuning);
        let before = state.blocks.len();

        assert!(maybe_trigger_random_event(&mut state, 5000.0).is_none());
        assert!(maybe_trigger_random_event(&mut state, 10_000.0).is_some());
        assert_eq!(state.blocks.len(), before + 1);
        assert_eq!(state.last_event_time, 10_000.0);

        state.random_blocks_enabled = false;
        assert!(maybe_trigger_random_event(&mut state, 30_000.0).is_none());
    }

    #[test]
    fn test_failed_roll_keeps_rolling_each_tick() {
        let never = Tuning {
            event_chance_base: 0.0,
            event_chance_per_level: 0.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(5, never);
        assert!(maybe_trigger_random_event(&mut state, 10_000.0).is_none());
        assert_eq!(state.last_event_time, 0.0);

        // Default odds: some tick shortly after the interval fires
        let mut state = GameState::new(5);
        let fired = (0..120)
            .map(|i| 10_000.0 + i as f64 * 16.67)
            .find_map(|now| maybe_trigger_random_event(&mut state, now).map(|_| now));
        let fired_at = fired.expect("an event within two seconds of the interval");
        assert_eq!(state.last_event_time, fired_at);
        assert!(maybe_trigger_random_event(&mut state, fired_at + 16.67).is_none());
    }

    #[test]
    fn test_urgent_block_never_overlaps() {
        let mut state = GameState::new(8);
        for i in 0..20 {
            spawn_urgent_block(&mut state, i as f64, true);
        }
        let live: Vec<&Block> = state.blocks.iter().filter(|b| b.is_active()).collect();
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                assert!(!rect_overlap(&a.bounds, &b.bounds));
            }
        }
    }

    #[test]
    fn test_board_urgent_block_takes_column_status() {
        let mut state = GameState::new(9);
        state.data_source = DataSource::Board;
        state.regenerate_blocks(0.0);
        let id = spawn_urgent_block(&mut state, 1234.0, false).expect("free slot");
        let block = state.blocks.iter().find(|b| b.id == id).expect("spawned");
        assert!(block.spawned_as_event && block.glow);
        assert_eq!(block.power_tag, PowerTag::None);
        assert_eq!(block.source.key.as_deref(), Some("URGENT-1234"));
        assert_eq!(block.source.status.as_deref(), Some(BOARD_STATUSES[block.column]));
        assert_eq!(block.max_strength, 2);
    }

    #[test]
    fn test_power_ups_disabled_means_no_tags() {
        let tuning = Tuning {
            power_up_chance: 1.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(4, tuning);
        state.power_ups_enabled = false;
        for i in 0..5 {
            spawn_urgent_block(&mut state, i as f64, true);
        }
        assert!(state.blocks.iter().all(|b| b.power_tag == PowerTag::None));
    }

    #[test]
    fn test_full_grid_is_a_no_op() {
        let mut state = GameState::new(10);
        let layout = state.layout();
        while spawn_urgent_block(&mut state, 0.0, false).is_some() {}
        assert!(layout.find_available_positions(&state.blocks).is_empty());
        let count = state.blocks.len();
        let events_before = state.events.len();
        assert!(trigger_random_event(&mut state, 1.0).is_none());
        assert_eq!(state.blocks.len(), count);
        assert_eq!(state.events.len(), events_before);
    }
}
