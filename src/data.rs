//! Source records that parametrize the block grid
//!
//! A level is built from a list of meetings (schedule view) or tasks (board
//! view). The core only reads a handful of fields to pick strength, category
//! and placement; everything else is display text.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Which kind of data the grid is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataSource {
    /// Calendar week: one column per day
    #[default]
    Schedule,
    /// Task board: one column per status
    Board,
}

/// Board columns, left to right
pub const BOARD_STATUSES: [&str; 7] = [
    "To Do",
    "In Progress",
    "Awaiting MR",
    "Ready for Testing",
    "In Testing",
    "Tested",
    "Done",
];

/// Calendar columns, left to right
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One meeting or task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Meeting subject or task summary
    pub title: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Lower-case priority (`lowest` .. `highest`, `urgent`)
    #[serde(default)]
    pub priority: Option<String>,
    /// Board column name
    #[serde(default)]
    pub status: Option<String>,
    /// Task key such as `PROJ-1042`
    #[serde(default)]
    pub key: Option<String>,
    /// Day of week, 0 = Monday
    #[serde(default)]
    pub day: Option<u8>,
    /// Minutes since midnight
    #[serde(default)]
    pub start_minute: Option<u32>,
}

impl SourceRecord {
    pub fn meeting(title: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            title: title.into(),
            duration_minutes: Some(duration_minutes),
            ..Default::default()
        }
    }

    pub fn task(
        key: impl Into<String>,
        title: impl Into<String>,
        status: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            key: Some(key.into()),
            status: Some(status.into()),
            priority: Some(priority.into().to_lowercase()),
            ..Default::default()
        }
    }
}

/// Supplies records for a data source.
///
/// `None` means the fetch failed; the game then starts with a placeholder grid.
pub trait DataProvider {
    fn fetch(&mut self, source: DataSource) -> Option<Vec<SourceRecord>>;
}

const MEETING_TYPES: &[&str] = &[
    "Daily Standup",
    "Sprint Planning",
    "Sprint Retrospective",
    "Code Review",
    "Architecture Discussion",
    "Client Demo",
    "Project Kickoff",
    "Bug Triage",
    "Performance Review",
    "Training Session",
    "Design Review",
    "Release Planning",
    "All Hands",
    "Quarterly Planning",
    "Technical Discussion",
    "Interview",
    "Onboarding",
];

const MEETING_DURATIONS: [u32; 6] = [15, 30, 45, 60, 90, 120];

const TASK_SUMMARIES: &[&str] = &[
    "Fix login authentication bug",
    "Add dark mode toggle to settings",
    "Implement user profile page",
    "Optimize database query performance",
    "Add unit tests for user service",
    "Update API documentation",
    "Refactor component architecture",
    "Implement search functionality",
    "Fix responsive design issues",
    "Add error handling for file uploads",
    "Integrate third-party payment system",
    "Improve loading states",
    "Add accessibility features",
    "Implement data export feature",
    "Fix memory leak in dashboard",
    "Add multilingual support",
    "Upgrade to latest framework version",
    "Implement real-time notifications",
    "Add advanced filtering options",
    "Optimize bundle size",
];

const TASK_PRIORITIES: [&str; 5] = ["lowest", "low", "medium", "high", "highest"];

fn pick<'a>(rng: &mut Pcg32, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

/// Seeded generator of plausible meetings and tasks
#[derive(Debug, Clone)]
pub struct MockProvider {
    rng: Pcg32,
    pub meeting_count: usize,
    pub task_count: usize,
    /// Board key prefix
    pub project_key: String,
}

impl MockProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            meeting_count: 50,
            task_count: 40,
            project_key: "PROJ".to_string(),
        }
    }

    fn meetings(&mut self) -> Vec<SourceRecord> {
        (0..self.meeting_count)
            .map(|_| {
                let duration = MEETING_DURATIONS[self.rng.random_range(0..MEETING_DURATIONS.len())];
                let mut record = SourceRecord::meeting(pick(&mut self.rng, MEETING_TYPES), duration);
                record.day = Some(self.rng.random_range(0..WEEKDAYS.len() as u8));
                // 08:00 to 18:00
                record.start_minute = Some(self.rng.random_range(8 * 60..18 * 60));
                record
            })
            .collect()
    }

    fn tasks(&mut self) -> Vec<SourceRecord> {
        (0..self.task_count)
            .map(|i| {
                SourceRecord::task(
                    format!("{}-{}", self.project_key, 1000 + i),
                    pick(&mut self.rng, TASK_SUMMARIES),
                    pick(&mut self.rng, &BOARD_STATUSES),
                    pick(&mut self.rng, &TASK_PRIORITIES),
                )
            })
            .collect()
    }
}

impl DataProvider for MockProvider {
    fn fetch(&mut self, source: DataSource) -> Option<Vec<SourceRecord>> {
        let records = match source {
            DataSource::Schedule => self.meetings(),
            DataSource::Board => self.tasks(),
        };
        log::debug!("Mock provider produced {} {:?} records", records.len(), source);
        Some(records)
    }
}
