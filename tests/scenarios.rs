use agenda_breaker::consts::{BOARD_BLOCK_HEIGHT, BOARD_BLOCK_SPACING, FRAME_MS};
use agenda_breaker::data::{DataProvider, DataSource, MockProvider, SourceRecord};
use agenda_breaker::sim::effects::{self, EffectKind};
use agenda_breaker::sim::events::spawn_urgent_block;
use agenda_breaker::sim::physics::rect_overlap;
use agenda_breaker::sim::{Ball, Block, BlockCategory, GameEvent, GamePhase, GameState, Rect, TickInput, tick};
use glam::Vec2;

/// Drives a session with synthetic timestamps
struct Runner {
    state: GameState,
    now: f64,
}

impl Runner {
    fn started(seed: u64) -> Self {
        let mut state = GameState::new(seed);
        state.start_game(0.0);
        state.take_events();
        Self { state, now: 0.0 }
    }

    fn step(&mut self, input: &TickInput) {
        self.now += FRAME_MS as f64;
        tick(&mut self.state, input, self.now);
    }

    fn idle(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step(&TickInput::default());
        }
    }

    fn add_block(&mut self, bounds: Rect) -> u32 {
        let id = self.state.next_entity_id();
        self.state.blocks.push(Block::new(
            id,
            bounds,
            SourceRecord::default(),
            BlockCategory::Placeholder,
            0,
        ));
        id
    }
}

fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[test]
fn test_three_lost_balls_end_the_game() {
    let mut run = Runner::started(1);

    for expected_lives in [2, 1, 0] {
        let ball = &mut run.state.balls[0];
        ball.pos = Vec2::new(40.0, 605.0);
        ball.launch(Vec2::new(0.0, 1.0));
        run.step(&TickInput::default());
        assert_eq!(run.state.lives, expected_lives);
    }

    assert_eq!(run.state.phase, GamePhase::GameOver);
    assert_eq!(run.state.lives, 0);
    let events = run.state.take_events();
    let game_overs = count(&events, |e| {
        matches!(e, GameEvent::PhaseChanged { to: GamePhase::GameOver, .. })
    });
    assert_eq!(game_overs, 1);

    // Further frames change nothing
    run.idle(10);
    assert_eq!(run.state.phase, GamePhase::GameOver);
    assert_eq!(run.state.lives, 0);
}

#[test]
fn test_clearing_the_last_blocks_completes_once() {
    let mut run = Runner::started(2);
    run.state.blocks.clear();
    run.add_block(Rect::new(200.0, 300.0, 40.0, 20.0));
    run.add_block(Rect::new(500.0, 300.0, 40.0, 20.0));

    // Two balls take out both blocks on the same frame
    run.state.balls[0].pos = Vec2::new(220.0, 330.0);
    run.state.balls[0].launch(Vec2::new(0.0, -1.0));
    let id = run.state.next_entity_id();
    let mut second = Ball::new(id, Vec2::new(520.0, 330.0), run.state.ball_speed);
    second.launch(Vec2::new(0.0, -1.0));
    run.state.balls.push(second);

    run.step(&TickInput::default());
    assert_eq!(run.state.phase, GamePhase::LevelComplete);
    assert_eq!(run.state.score, 20);

    run.idle(30);
    let events = run.state.take_events();
    let completions = count(&events, |e| matches!(e, GameEvent::LevelComplete { .. }));
    assert_eq!(completions, 1);
    assert_eq!(run.state.phase, GamePhase::LevelComplete);
}

#[test]
fn test_pause_resume_keeps_exact_velocity() {
    let mut run = Runner::started(3);
    run.state.blocks.clear();
    run.add_block(Rect::new(10.0, 80.0, 40.0, 20.0));

    let ball = &mut run.state.balls[0];
    ball.launched = true;
    ball.pos = Vec2::new(400.0, 300.0);
    ball.speed = 5.0;
    ball.vel = Vec2::new(3.0, -4.0);

    let pause = TickInput {
        pause: true,
        ..Default::default()
    };
    run.step(&pause);
    assert_eq!(run.state.phase, GamePhase::Paused);
    assert_eq!(run.state.balls[0].pos, Vec2::new(400.0, 300.0));

    run.now += 5000.0;
    run.step(&pause);
    assert_eq!(run.state.phase, GamePhase::Playing);
    assert_eq!(run.state.balls[0].vel, Vec2::new(3.0, -4.0));
    assert_eq!(run.state.balls[0].speed, 5.0);
    assert_eq!(run.state.balls[0].pos, Vec2::new(403.0, 296.0));
    assert!(!run.state.skip_normalization);
}

#[test]
fn test_explosion_takes_neighbors_and_is_consumed() {
    let mut run = Runner::started(4);
    run.state.blocks.clear();
    let target = run.add_block(Rect::new(100.0, 100.0, 40.0, 20.0));
    let neighbor = run.add_block(Rect::new(150.0, 100.0, 40.0, 20.0));
    let far = run.add_block(Rect::new(600.0, 100.0, 40.0, 20.0));

    assert!(effects::activate(&mut run.state, EffectKind::Explosion, run.now));

    let ball = &mut run.state.balls[0];
    ball.pos = Vec2::new(120.0, 130.0);
    ball.launch(Vec2::new(0.0, -1.0));
    run.step(&TickInput::default());

    let destroyed = |state: &GameState, id: u32| state.blocks.iter().any(|b| b.id == id && b.destroyed);
    assert!(destroyed(&run.state, target));
    assert!(destroyed(&run.state, neighbor));
    assert!(!destroyed(&run.state, far));
    assert!(!run.state.effects.is_active(EffectKind::Explosion));
    assert_eq!(run.state.score, 20);
    assert_eq!(run.state.phase, GamePhase::Playing);
}

#[test]
fn test_winning_after_the_last_level() {
    let mut run = Runner::started(5);
    let mut provider = MockProvider::new(5);
    for source in [DataSource::Schedule, DataSource::Board] {
        run.state.set_records(source, provider.fetch(source));
    }

    for level in 1..=run.state.tuning.max_level {
        assert_eq!(run.state.level, level);
        for block in &mut run.state.blocks {
            block.shatter();
        }
        run.step(&TickInput::default());
        assert_eq!(run.state.phase, GamePhase::LevelComplete);
        run.state.proceed_to_next_level();
        run.state.start_next_level(run.now);
        assert_eq!(run.state.phase, GamePhase::Playing);
    }

    assert_eq!(run.state.level, run.state.tuning.max_level + 1);
    run.idle(10);
    assert_eq!(run.state.phase, GamePhase::Win);
}

#[test]
fn test_board_column_collapses_after_removal() {
    let mut state = GameState::new(6);
    let records = MockProvider::new(6).fetch(DataSource::Board);
    state.switch_data_source(DataSource::Board, records, 0.0);
    let mut run = Runner { state, now: 0.0 };
    run.state.start_game(0.0);

    let fullest = (0..7)
        .max_by_key(|c| run.state.blocks.iter().filter(|b| b.column == *c).count())
        .unwrap_or(0);
    let mut column: Vec<(u32, f32)> = run
        .state
        .blocks
        .iter()
        .filter(|b| b.column == fullest)
        .map(|b| (b.id, b.bounds.y))
        .collect();
    column.sort_by(|a, b| a.1.total_cmp(&b.1));
    assert!(column.len() >= 2);
    let (top, _) = column[0];
    let (below, below_y) = column[1];

    if let Some(block) = run.state.blocks.iter_mut().find(|b| b.id == top) {
        block.shatter();
    }
    run.idle(60);

    assert!(run.state.blocks.iter().all(|b| b.id != top));
    let moved = run
        .state
        .blocks
        .iter()
        .find(|b| b.id == below)
        .map(|b| b.bounds.y);
    assert_eq!(moved, Some(below_y - (BOARD_BLOCK_HEIGHT + BOARD_BLOCK_SPACING)));
}

#[test]
fn test_urgent_blocks_wait_for_fading_board_slots() {
    let mut state = GameState::new(6);
    let records = MockProvider::new(6).fetch(DataSource::Board);
    state.switch_data_source(DataSource::Board, records, 0.0);
    let mut run = Runner { state, now: 0.0 };
    run.state.start_game(0.0);

    let Some(top) = run
        .state
        .blocks
        .iter_mut()
        .filter(|b| b.column == 0)
        .min_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y))
    else {
        panic!("column 0 is empty");
    };
    top.shatter();
    let fading = top.bounds;

    let mut injected = 0;
    while spawn_urgent_block(&mut run.state, run.now, false).is_some() {
        injected += 1;
    }
    assert!(injected > 0);
    assert!(
        run.state
            .blocks
            .iter()
            .filter(|b| b.spawned_as_event)
            .all(|b| !rect_overlap(&b.bounds, &fading))
    );

    run.idle(80);
    let live: Vec<Rect> = run.state.blocks.iter().map(|b| b.bounds).collect();
    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            assert!(!rect_overlap(a, b), "{:?} overlaps {:?}", a, b);
        }
    }
}

#[test]
fn test_restart_after_game_over() {
    let mut run = Runner::started(7);
    run.state.score = 120;
    for _ in 0..3 {
        run.state.balls[0].pos = Vec2::new(40.0, 605.0);
        run.state.balls[0].launch(Vec2::new(0.0, 1.0));
        run.step(&TickInput::default());
    }
    assert_eq!(run.state.phase, GamePhase::GameOver);

    run.state.start_game(run.now);
    let snapshot = run.state.snapshot();
    assert_eq!(snapshot.phase, GamePhase::Playing);
    assert_eq!((snapshot.score, snapshot.lives, snapshot.level), (0, 3, 1));
    assert_eq!(run.state.balls.len(), 1);
}
