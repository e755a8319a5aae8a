//! Destructible blocks built from meetings and tasks

use serde::{Deserialize, Serialize};

use super::physics::Rect;
use crate::data::{DataSource, SourceRecord};

/// Points per unit of max strength
pub const BLOCK_BASE_SCORE: u64 = 10;
/// Hit flash decay per reference frame
pub const HIT_FLASH_DECAY: f32 = 0.05;

/// What a block was generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockCategory {
    /// Filler when there is no source data
    Placeholder,
    /// Calendar meeting
    ScheduleItem,
    /// Task board item
    BoardItem,
}

impl BlockCategory {
    pub fn for_source(source: DataSource) -> Self {
        match source {
            DataSource::Schedule => Self::ScheduleItem,
            DataSource::Board => Self::BoardItem,
        }
    }
}

/// Power-up carried by a block, released when it is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerTag {
    #[default]
    None,
    Beneficial,
    Detrimental,
}

/// Hit points for a record.
///
/// Meetings get tougher with length (an hour is 2, two hours 3), tasks with
/// priority (high is 2, highest/urgent 3). Missing fields fall to the lowest
/// tier except duration, which defaults to half an hour.
pub fn derive_strength(category: BlockCategory, record: &SourceRecord) -> u32 {
    match category {
        BlockCategory::Placeholder => 1,
        BlockCategory::ScheduleItem => match record.duration_minutes.unwrap_or(30) {
            d if d >= 120 => 3,
            d if d >= 60 => 2,
            _ => 1,
        },
        BlockCategory::BoardItem => {
            match record.priority.as_deref().map(str::to_lowercase).as_deref() {
                Some("urgent") | Some("highest") => 3,
                Some("high") => 2,
                _ => 1,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub bounds: Rect,
    pub source: SourceRecord,
    pub category: BlockCategory,
    pub strength: u32,
    pub max_strength: u32,
    pub destroyed: bool,
    pub power_tag: PowerTag,
    /// Injected mid-level by a random event
    pub spawned_as_event: bool,
    pub glow: bool,
    /// Timestamp (ms) the block appeared
    pub spawn_time: f64,
    /// Layout column (day or status index)
    pub column: usize,
    /// 1.0 right after a hit, decays to 0
    pub hit_flash: f32,
    /// 1.0 on destruction, decays to 0 over the removal grace period
    pub destroy_fade: f32,
}

impl Block {
    pub fn new(
        id: u32,
        bounds: Rect,
        source: SourceRecord,
        category: BlockCategory,
        column: usize,
    ) -> Self {
        let strength = derive_strength(category, &source);
        Self {
            id,
            bounds,
            source,
            category,
            strength,
            max_strength: strength,
            destroyed: false,
            power_tag: PowerTag::None,
            spawned_as_event: false,
            glow: false,
            spawn_time: 0.0,
            column,
            hit_flash: 0.0,
            destroy_fade: 0.0,
        }
    }

    /// Take one hit. Returns true if this hit destroyed the block.
    ///
    /// Hits on an already destroyed block do nothing and return false.
    pub fn hit(&mut self) -> bool {
        if self.destroyed {
            return false;
        }

        self.strength = self.strength.saturating_sub(1);
        self.hit_flash = 1.0;

        if self.strength == 0 {
            self.destroy();
            return true;
        }
        false
    }

    /// Destroy regardless of remaining strength (explosions, chain strikes).
    /// Returns false if it was already destroyed.
    pub fn shatter(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.strength = 0;
        self.destroy();
        true
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.destroy_fade = 1.0;
    }

    /// Points awarded on destruction; depends only on max strength and category
    pub fn get_score(&self) -> u64 {
        block_score(self.max_strength, self.category)
    }

    /// Opacity for a damaged block: full at max strength, 0.3 floor
    pub fn damage_weight(&self) -> f32 {
        if self.max_strength == 0 {
            return 1.0;
        }
        0.3 + 0.7 * self.strength as f32 / self.max_strength as f32
    }

    /// Advance hit and destruction animations by `frames` reference frames.
    /// The destruction fade lasts `removal_grace_frames`.
    pub fn update(&mut self, frames: f32, removal_grace_frames: f32) {
        if self.hit_flash > 0.0 {
            self.hit_flash = (self.hit_flash - HIT_FLASH_DECAY * frames).max(0.0);
        }
        if self.destroyed && self.destroy_fade > 0.0 {
            let step = frames / removal_grace_frames.max(1.0);
            self.destroy_fade = (self.destroy_fade - step).max(0.0);
        }
    }

    /// Destroyed and faded out; safe to drop from the active set
    pub fn should_remove(&self) -> bool {
        self.destroyed && self.destroy_fade <= 0.0
    }

    pub fn is_active(&self) -> bool {
        !self.destroyed
    }
}

/// Score for a block: 10 per strength point, half again for real data
pub fn block_score(max_strength: u32, category: BlockCategory) -> u64 {
    let base = BLOCK_BASE_SCORE * max_strength as u64;
    match category {
        BlockCategory::Placeholder => base,
        BlockCategory::ScheduleItem | BlockCategory::BoardItem => base * 3 / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn block_with(category: BlockCategory, record: SourceRecord) -> Block {
        Block::new(1, Rect::new(0.0, 0.0, 100.0, 30.0), record, category, 0)
    }

    #[test]
    fn test_schedule_strength_tiers() {
        let strength = |d| derive_strength(BlockCategory::ScheduleItem, &SourceRecord::meeting("m", d));
        assert_eq!(strength(15), 1);
        assert_eq!(strength(45), 1);
        assert_eq!(strength(60), 2);
        assert_eq!(strength(90), 2);
        assert_eq!(strength(120), 3);

        let no_duration = SourceRecord::default();
        assert_eq!(derive_strength(BlockCategory::ScheduleItem, &no_duration), 1);
    }

    #[test]
    fn test_board_strength_tiers() {
        let strength = |p: &str| {
            derive_strength(BlockCategory::BoardItem, &SourceRecord::task("K-1", "t", "To Do", p))
        };
        assert_eq!(strength("Highest"), 3);
        assert_eq!(strength("urgent"), 3);
        assert_eq!(strength("high"), 2);
        assert_eq!(strength("medium"), 1);
        assert_eq!(derive_strength(BlockCategory::BoardItem, &SourceRecord::default()), 1);
    }

    #[test]
    fn test_placeholder_is_always_one() {
        let record = SourceRecord::meeting("long", 240);
        assert_eq!(derive_strength(BlockCategory::Placeholder, &record), 1);
    }

    #[test]
    fn test_hit_until_destroyed() {
        let mut block = block_with(BlockCategory::ScheduleItem, SourceRecord::meeting("m", 120));
        assert_eq!(block.max_strength, 3);

        assert!(!block.hit());
        assert_eq!(block.strength, 2);
        assert!((block.damage_weight() - (0.3 + 0.7 * 2.0 / 3.0)).abs() < 1e-6);
        assert!(!block.hit());
        assert!(block.hit());
        assert!(block.destroyed);
        assert_eq!(block.destroy_fade, 1.0);
    }

    #[test]
    fn test_hit_after_destruction_is_noop() {
        let mut block = block_with(BlockCategory::Placeholder, SourceRecord::default());
        assert!(block.hit());
        for _ in 0..5 {
            assert!(!block.hit());
            assert_eq!(block.strength, 0);
        }
        assert!(!block.shatter());
    }

    #[test]
    fn test_should_remove_after_grace() {
        let mut block = block_with(BlockCategory::Placeholder, SourceRecord::default());
        block.update(1.0, 50.0);
        assert!(!block.should_remove());

        block.shatter();
        assert!(!block.should_remove());
        for _ in 0..49 {
            block.update(1.0, 50.0);
        }
        assert!(!block.should_remove());
        block.update(1.5, 50.0);
        assert!(block.should_remove());
    }

    #[test]
    fn test_score_values() {
        assert_eq!(block_score(1, BlockCategory::Placeholder), 10);
        assert_eq!(block_score(1, BlockCategory::ScheduleItem), 15);
        assert_eq!(block_score(3, BlockCategory::BoardItem), 45);
    }

    proptest! {
        #[test]
        fn score_ignores_current_strength(
            duration in 0u32..300,
            hits in 0usize..4,
        ) {
            let mut block = block_with(BlockCategory::ScheduleItem, SourceRecord::meeting("m", duration));
            let before = block.get_score();
            for _ in 0..hits {
                block.hit();
            }
            prop_assert_eq!(block.get_score(), before);
            prop_assert_eq!(before, block_score(block.max_strength, block.category));
        }
    }
}
