//! Block grid generation
//!
//! Two column layouts share one non-overlap rule:
//! - Board: one column per status, blocks stacked top-down with fixed
//!   spacing. Removing a block collapses the column upward.
//! - Schedule: one column per weekday, blocks occupy runs of half-hour units
//!   sized by meeting length. Removals leave their slots empty.
//!
//! Both expose the vacant slots of the current grid so events can inject
//! blocks without overlapping anything.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::block::{Block, BlockCategory};
use super::physics::{Rect, rect_overlap};
use crate::consts::*;
use crate::data::{BOARD_STATUSES, DataSource, SourceRecord, WEEKDAYS};

pub const BOARD_COLUMNS: usize = BOARD_STATUSES.len();
pub const SCHEDULE_COLUMNS: usize = WEEKDAYS.len();
/// Monday to Friday each get at least one block
pub const WORKDAYS: usize = 5;
/// Per-column base capacity is drawn from this range each level
pub const BASE_CAPACITY_MIN: usize = 10;
pub const BASE_CAPACITY_MAX: usize = 20;

/// Title shown on filler blocks
pub const PLACEHOLDER_TITLE: &str = "Block";

/// A vacant place a block could go
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub column: usize,
    pub bounds: Rect,
}

/// Blocks allowed per column at `level`: 2.6 more per level over `base`, capped
pub fn max_blocks_per_column(base: usize, level: u32, cap: usize) -> usize {
    let bonus = level as usize * 26 / 10;
    (base + bonus).min(cap)
}

/// Minimum number of records a level is built from
fn target_count(columns: usize, level: u32) -> usize {
    columns * (level as usize + 1)
}

/// Pad `records` by cycling through them until `target` is reached.
/// With no records at all the grid is made of placeholders.
fn expand_records(
    records: &[SourceRecord],
    target: usize,
    source: DataSource,
) -> (Vec<SourceRecord>, BlockCategory) {
    if records.is_empty() {
        let placeholder = SourceRecord {
            title: PLACEHOLDER_TITLE.to_string(),
            ..Default::default()
        };
        return (vec![placeholder; target], BlockCategory::Placeholder);
    }

    let count = records.len().max(target);
    let expanded = records.iter().cycle().take(count).cloned().collect();
    (expanded, BlockCategory::for_source(source))
}

/// Status-column stacking layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub width: f32,
    pub height: f32,
}

impl BoardLayout {
    fn column_width(&self) -> f32 {
        self.width / BOARD_COLUMNS as f32
    }

    fn start_y(&self) -> f32 {
        BOARD_HEADER_HEIGHT + LAYOUT_TOP_GAP
    }

    fn row_pitch(&self) -> f32 {
        BOARD_BLOCK_HEIGHT + BOARD_BLOCK_SPACING
    }

    fn cell(&self, column: usize, row: usize) -> Rect {
        let column_width = self.column_width();
        Rect::new(
            column as f32 * column_width + COLUMN_PADDING,
            self.start_y() + row as f32 * self.row_pitch(),
            column_width - COLUMN_PADDING * 2.0,
            BOARD_BLOCK_HEIGHT,
        )
    }

    /// Deal records round-robin across the status columns. Each record takes
    /// on the status of the column it lands in.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        records: &[SourceRecord],
        level: u32,
        rng: &mut R,
    ) -> Vec<Block> {
        let base = rng.random_range(BASE_CAPACITY_MIN..=BASE_CAPACITY_MAX);
        let per_column = max_blocks_per_column(base, level, BOARD_COLUMN_CAP);
        let (records, category) =
            expand_records(records, target_count(BOARD_COLUMNS, level), DataSource::Board);

        let floor = self.height - PADDLE_CLEARANCE;
        let mut rows = [0usize; BOARD_COLUMNS];
        let mut column = 0;
        let mut blocks = Vec::new();

        for mut record in records {
            if rows[column] >= per_column {
                // Round-robin keeps columns level, so one full column means all are
                break;
            }
            let bounds = self.cell(column, rows[column]);
            rows[column] += 1;
            let this_column = column;
            column = (column + 1) % BOARD_COLUMNS;

            if bounds.bottom() >= floor {
                continue;
            }
            if category == BlockCategory::BoardItem {
                record.status = Some(BOARD_STATUSES[this_column].to_string());
            }
            blocks.push(Block::new(0, bounds, record, category, this_column));
        }

        blocks
    }

    pub fn find_available_positions(&self, blocks: &[Block]) -> Vec<Slot> {
        let max_y = self.height - EVENT_CLEARANCE;
        let mut slots = Vec::new();
        for column in 0..BOARD_COLUMNS {
            let mut row = 0;
            loop {
                let bounds = self.cell(column, row);
                if bounds.y >= max_y {
                    break;
                }
                if is_vacant(&bounds, blocks) {
                    slots.push(Slot { column, bounds });
                }
                row += 1;
            }
        }
        slots
    }

    /// Shift blocks below each removed block up by one row
    pub fn collapse_after_removal(&self, blocks: &mut [Block], removed: &[Block]) {
        // Bottom-most first so blocks below several removals shift once per removal
        let mut removed: Vec<&Block> = removed.iter().collect();
        removed.sort_by(|a, b| b.bounds.y.total_cmp(&a.bounds.y));

        for gone in removed {
            for block in blocks
                .iter_mut()
                .filter(|b| b.column == gone.column && b.bounds.y > gone.bounds.y)
            {
                block.bounds.y -= self.row_pitch();
            }
        }
    }
}

/// Weekday/time-slot layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleLayout {
    pub width: f32,
    pub height: f32,
}

/// Half-hour units a meeting occupies: half a slot up to 30 minutes, one
/// slot up to an hour, two beyond
pub fn duration_units(duration_minutes: Option<u32>) -> usize {
    match duration_minutes.unwrap_or(30) {
        d if d <= 30 => 1,
        d if d <= 60 => 2,
        _ => 4,
    }
}

impl ScheduleLayout {
    fn day_width(&self) -> f32 {
        (self.width - SCHEDULE_TIME_COLUMN_WIDTH) / SCHEDULE_COLUMNS as f32
    }

    fn start_y(&self) -> f32 {
        SCHEDULE_HEADER_HEIGHT + LAYOUT_TOP_GAP
    }

    /// Half-hour units that fit above the paddle clearance
    pub fn units_per_day(&self) -> usize {
        let usable = self.height - PADDLE_CLEARANCE - self.start_y();
        if usable <= 0.0 {
            return 0;
        }
        (usable / SCHEDULE_HALF_SLOT_HEIGHT).floor() as usize
    }

    fn cell(&self, day: usize, start_unit: usize, units: usize) -> Rect {
        let day_width = self.day_width();
        Rect::new(
            SCHEDULE_TIME_COLUMN_WIDTH + day as f32 * day_width + COLUMN_PADDING,
            self.start_y() + start_unit as f32 * SCHEDULE_HALF_SLOT_HEIGHT,
            day_width - COLUMN_PADDING * 2.0,
            units as f32 * SCHEDULE_HALF_SLOT_HEIGHT - SCHEDULE_BLOCK_GAP,
        )
    }

    /// Bucket records by weekday, then drop each into a random vacant run of
    /// units in its column.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        records: &[SourceRecord],
        level: u32,
        rng: &mut R,
    ) -> Vec<Block> {
        let units = self.units_per_day();
        if units == 0 {
            log::warn!("Playfield too short for a schedule grid ({}px)", self.height);
            return Vec::new();
        }

        let base = rng.random_range(BASE_CAPACITY_MIN..=BASE_CAPACITY_MAX);
        let per_day = max_blocks_per_column(base, level, SCHEDULE_DAY_CAP);
        let (records, category) = expand_records(
            records,
            target_count(SCHEDULE_COLUMNS, level),
            DataSource::Schedule,
        );

        let mut by_day: Vec<Vec<SourceRecord>> = vec![Vec::new(); SCHEDULE_COLUMNS];
        for (i, record) in records.into_iter().enumerate() {
            let day = record
                .day
                .map(|d| d as usize % SCHEDULE_COLUMNS)
                .unwrap_or(i % SCHEDULE_COLUMNS);
            by_day[day].push(record);
        }

        for day in 0..WORKDAYS {
            if !by_day[day].is_empty() {
                continue;
            }
            let mut filler = by_day
                .iter()
                .flatten()
                .next()
                .cloned()
                .unwrap_or_else(|| SourceRecord {
                    title: PLACEHOLDER_TITLE.to_string(),
                    ..Default::default()
                });
            filler.day = Some(day as u8);
            by_day[day].push(filler);
        }

        let mut blocks = Vec::new();
        for (day, day_records) in by_day.into_iter().enumerate() {
            let mut occupied = vec![false; units];
            for record in day_records.into_iter().take(per_day) {
                let need = duration_units(record.duration_minutes).min(units);
                let starts: Vec<usize> = (0..=units - need)
                    .filter(|&s| occupied[s..s + need].iter().all(|taken| !taken))
                    .collect();
                let Some(&start) = starts.choose(rng) else {
                    log::debug!("No room for '{}' on {}", record.title, WEEKDAYS[day]);
                    continue;
                };
                occupied[start..start + need].fill(true);
                blocks.push(Block::new(0, self.cell(day, start, need), record, category, day));
            }
        }

        blocks
    }

    pub fn find_available_positions(&self, blocks: &[Block]) -> Vec<Slot> {
        let max_y = self.height - EVENT_CLEARANCE;
        let mut slots = Vec::new();
        for day in 0..SCHEDULE_COLUMNS {
            for unit in 0..self.units_per_day() {
                let bounds = self.cell(day, unit, 1);
                if bounds.y >= max_y {
                    break;
                }
                if is_vacant(&bounds, blocks) {
                    slots.push(Slot { column: day, bounds });
                }
            }
        }
        slots
    }
}

/// No block overlaps `bounds`. A destroyed block still fading out holds its
/// place: on the board, the blocks below it move up into that row once it
/// is pruned.
fn is_vacant(bounds: &Rect, blocks: &[Block]) -> bool {
    !blocks.iter().any(|b| rect_overlap(bounds, &b.bounds))
}

/// Layout for the active data source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layout {
    Board(BoardLayout),
    Schedule(ScheduleLayout),
}

impl Layout {
    pub fn for_source(source: DataSource, width: f32, height: f32) -> Self {
        match source {
            DataSource::Board => Self::Board(BoardLayout { width, height }),
            DataSource::Schedule => Self::Schedule(ScheduleLayout { width, height }),
        }
    }

    /// Build a level's blocks. Ids are left at 0 for the caller to assign.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        records: &[SourceRecord],
        level: u32,
        rng: &mut R,
    ) -> Vec<Block> {
        let blocks = match self {
            Self::Board(layout) => layout.generate(records, level, rng),
            Self::Schedule(layout) => layout.generate(records, level, rng),
        };
        log::info!(
            "Generated {} blocks for level {} from {} records",
            blocks.len(),
            level,
            records.len()
        );
        blocks
    }

    pub fn find_available_positions(&self, blocks: &[Block]) -> Vec<Slot> {
        match self {
            Self::Board(layout) => layout.find_available_positions(blocks),
            Self::Schedule(layout) => layout.find_available_positions(blocks),
        }
    }

    /// Close gaps left by removed blocks. Only the board collapses.
    pub fn collapse_after_removal(&self, blocks: &mut [Block], removed: &[Block]) {
        if let Self::Board(layout) = self {
            layout.collapse_after_removal(blocks, removed);
        }
    }
}
