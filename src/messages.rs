//! Notification text
//!
//! Each pool has a variant per data source. The simulation picks a line with
//! its own RNG so message choice stays reproducible.

use rand::Rng;

use crate::data::DataSource;

/// Which moment a message is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePool {
    LevelComplete,
    DifficultyWarning,
    RandomEvent,
    GameOver,
}

const LEVEL_COMPLETE_SCHEDULE: &[&str] = &[
    "This week is done, give me another one!",
    "Meeting marathon completed! Ready for round two?",
    "Calendar cleared! Time for more 'urgent' discussions?",
    "All syncs synced! Bring on the next wave of productivity theater!",
    "Week's schedule demolished! Who's ready for more back-to-back calls?",
    "Meetings: 0, Productivity: Questionable. Next week please!",
];

const LEVEL_COMPLETE_BOARD: &[&str] = &[
    "Sprint completed! Ready for more 'quick wins'?",
    "Backlog cleared! Time for some new technical debt!",
    "All tasks done! Waiting for the next 'urgent' priority shuffle...",
    "Board cleaned up! Ready for more scope creep?",
    "Stories completed! Time for the PM to add 'just one more feature'?",
    "Done column is full! Bring on the next impossible deadline!",
];

const DIFFICULTY_SCHEDULE: &[&str] = &[
    "I finished your work too fast, take some more meetings!",
    "Hey pal, a new manager assigned you more calls!",
    "Congratulations! You are rewarded with more work to do!",
    "Efficiency detected! Time for some additional 'alignment' sessions!",
    "Great job! Here's your prize: more status updates!",
    "Performance review says you need more collaborative opportunities!",
    "Success! Your reward is a packed calendar next week!",
];

const DIFFICULTY_BOARD: &[&str] = &[
    "I finished your work too fast, take some more tasks!",
    "Hey pal, a new product manager assigned you more tickets!",
    "Congratulations! You are rewarded with more work to do!",
    "Velocity too high! Time for some additional complexity!",
    "Great job! Here's your bonus: more edge cases to handle!",
    "Stand-up feedback: You need more 'challenging' user stories!",
    "Achievement unlocked: Even more technical debt to resolve!",
];

const RANDOM_EVENT_SCHEDULE: &[&str] = &[
    "🚨 Oops! HR wants a 1-on-1 ASAP",
    "📞 Emergency! Client called for an 'urgent' 15-min chat",
    "⚡ Breaking: Manager scheduled a quick sync about syncing",
    "🔥 Hot off the press: Another 'brief' status update meeting",
    "📅 Plot twist: Mandatory team building session appeared!",
    "🎯 Surprise! Last-minute demo prep meeting materialized",
    "☕ Alert: Coffee chat turned into strategic planning session",
    "📊 News flash: Stakeholder wants to 'align on priorities'",
    "🤝 Incoming: Cross-team collaboration opportunity (aka more meetings)",
    "🎪 Ta-da! Another 'quick' brainstorming session spawned",
];

const RANDOM_EVENT_BOARD: &[&str] = &[
    "🚨 Oops! Critical bug just crawled out of production",
    "🔥 Breaking: 'Simple' task got 5 new acceptance criteria",
    "⚡ Emergency! Stakeholder remembered one tiny requirement",
    "📈 Plot twist: QA found edge cases in your edge cases",
    "🎯 Surprise! Security review revealed 'minor' concerns",
    "🤔 Alert: Product owner had a 'brilliant' idea at 3 AM",
    "📊 News flash: Designer wants to 'improve user experience'",
    "🔧 Incoming: DevOps needs you to 'quickly' fix the pipeline",
    "🎪 Ta-da! Another 'high priority' ticket appeared",
    "⭐ Magic! Technical debt decided to compound itself",
];

const GAME_OVER_SCHEDULE: &[&str] = &[
    "You are pathetic, AI will do your job.",
    "Maybe stick to playing solitaire during meetings?",
    "Performance review: Needs improvement... in everything.",
    "Don't worry, we'll just hire more consultants.",
    "Your calendar management skills are as bad as your gameplay.",
    "Time to update your LinkedIn - 'Former Meeting Destroyer'.",
];

const GAME_OVER_BOARD: &[&str] = &[
    "You are pathetic, AI will do your job.",
    "Maybe coding isn't for you? Try product management.",
    "Error 404: Programming skills not found.",
    "Don't worry, we'll just outsource your tasks.",
    "Your bug-squashing skills need some debugging.",
    "Time to update your resume - 'Former Task Terminator'.",
];

/// All lines for a pool and source
pub fn pool(kind: MessagePool, source: DataSource) -> &'static [&'static str] {
    use DataSource::*;
    use MessagePool::*;
    match (kind, source) {
        (LevelComplete, Schedule) => LEVEL_COMPLETE_SCHEDULE,
        (LevelComplete, Board) => LEVEL_COMPLETE_BOARD,
        (DifficultyWarning, Schedule) => DIFFICULTY_SCHEDULE,
        (DifficultyWarning, Board) => DIFFICULTY_BOARD,
        (RandomEvent, Schedule) => RANDOM_EVENT_SCHEDULE,
        (RandomEvent, Board) => RANDOM_EVENT_BOARD,
        (GameOver, Schedule) => GAME_OVER_SCHEDULE,
        (GameOver, Board) => GAME_OVER_BOARD,
    }
}

/// Pick a random line
pub fn pick<R: Rng + ?Sized>(rng: &mut R, kind: MessagePool, source: DataSource) -> &'static str {
    let lines = pool(kind, source);
    lines[rng.random_range(0..lines.len())]
}
